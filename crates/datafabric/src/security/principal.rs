/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Kerberos principals.
//!
//! A principal has the form `name[/instance][@REALM]`. Each component is
//! non-empty and contains neither `/` nor `@`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

static PRINCIPAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^/@]+)(?:/([^/@]+))?(?:@([^/@]+))?$").expect("valid regex"));

/// Errors produced when a principal string is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrincipalError {
    #[error("Principal must not be empty")]
    Empty,

    #[error("Malformed Kerberos principal '{0}': expected name[/instance][@REALM]")]
    Malformed(String),
}

/// A Kerberos principal string.
///
/// Constructing a principal with [`KerberosPrincipal::new`] does not check
/// it; stores validate on write via [`KerberosPrincipal::validate`] so that
/// malformed input is rejected at the store boundary. Use
/// [`KerberosPrincipal::parse`] to validate eagerly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KerberosPrincipal(String);

impl KerberosPrincipal {
    pub fn new(principal: impl Into<String>) -> Self {
        Self(principal.into())
    }

    /// Creates a principal, rejecting malformed input.
    pub fn parse(principal: impl Into<String>) -> Result<Self, PrincipalError> {
        let principal = Self::new(principal);
        principal.validate()?;
        Ok(principal)
    }

    pub fn validate(&self) -> Result<(), PrincipalError> {
        if self.0.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if PRINCIPAL_PATTERN.is_match(&self.0) {
            Ok(())
        } else {
            Err(PrincipalError::Malformed(self.0.clone()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary component (`alice` in `alice/host@REALM`).
    pub fn short_name(&self) -> Option<&str> {
        self.captures().and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    pub fn instance(&self) -> Option<&str> {
        self.captures().and_then(|c| c.get(2)).map(|m| m.as_str())
    }

    pub fn realm(&self) -> Option<&str> {
        self.captures().and_then(|c| c.get(3)).map(|m| m.as_str())
    }

    fn captures(&self) -> Option<regex::Captures<'_>> {
        PRINCIPAL_PATTERN.captures(&self.0)
    }
}

impl fmt::Display for KerberosPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
