// SPDX-License-Identifier: GPL-3.0-only

//! Hardware and platform collaborators of the capture screen

pub mod camera;
pub mod permission;
