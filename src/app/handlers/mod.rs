// SPDX-License-Identifier: GPL-3.0-only

//! Message handlers, split by concern

mod camera;
mod capture;
mod permission;
