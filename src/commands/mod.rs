// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod activities;
pub mod attachments;
pub mod clients;
pub mod config;
pub mod doctor;
pub mod expenses;
pub mod exporter;
pub mod fx;
pub mod income;
pub mod invoices;
pub mod leads;
pub mod milestones;
pub mod projects;
pub mod records;
pub mod reports;
