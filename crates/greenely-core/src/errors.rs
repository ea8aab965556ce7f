// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Greenely Sensors.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use thiserror::Error;

/// Sensor update error types
///
/// None of these ever reach the host: `SensorEntity::update` logs them and the
/// sensor keeps reporting its last snapshot.
#[derive(Error, Debug)]
pub enum SensorError {
    #[error("Authentication failed: Greenely session could not be validated")]
    AuthenticationFailure,

    #[error("Failed to fetch {what}: {source:#}")]
    FetchFailure {
        what: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Malformed record '{localtime}': {reason}")]
    MappingFailure { localtime: String, reason: String },
}

impl SensorError {
    pub fn fetch(what: &'static str, source: anyhow::Error) -> Self {
        Self::FetchFailure { what, source }
    }
}

pub type SensorResult<T> = Result<T, SensorError>;
