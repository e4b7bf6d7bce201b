// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for Polyframe Mesh

pub mod commands;
pub mod reporter;

pub use commands::WriteSummary;
pub use reporter::Reporter;
