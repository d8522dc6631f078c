//! # Controller Module
//!
//! Linux host integration for the PS5 DualSense controller.
//!
//! This module handles:
//! - Gamepad and motion sensor node discovery via evdev
//! - Mapping evdev events to the standard gamepad layout and rotation samples
//! - Reader threads that feed the synthesis engine over tokio channels

pub mod dualsense;
pub mod mapper;
pub mod reader;
