// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret lookup from the process environment.
//!
//! Every credential the service needs (management client secret, enrichment
//! API key) can be given either inline as `VAR=value` or as a path in
//! `VAR_FILE`, which is how Docker and Kubernetes mount secrets. The file form
//! wins when both are set.

use std::path::PathBuf;
use std::{env, fs};

use enrich_common_secret::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretEnvError {
	#[error("failed to read secret file at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("secret file path in {var} is empty")]
	EmptyPath { var: String },
}

/// Load `var` from `{var}_FILE` or `{var}`.
///
/// A single trailing newline is stripped from file contents. Empty inline
/// values count as unset.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = env::var(&file_var) {
		if path_str.trim().is_empty() {
			return Err(SecretEnvError::EmptyPath { var: file_var });
		}

		let path = PathBuf::from(path_str);
		let content = fs::read_to_string(&path).map_err(|source| SecretEnvError::Io {
			path: path.clone(),
			source,
		})?;
		let value = content
			.strip_suffix("\r\n")
			.or_else(|| content.strip_suffix('\n'))
			.unwrap_or(&content)
			.to_string();
		return Ok(Some(SecretString::new(value)));
	}

	match env::var(var) {
		Ok(value) if !value.is_empty() => Ok(Some(SecretString::new(value))),
		_ => Ok(None),
	}
}

/// Like [`load_secret_env`] but absence is an error.
pub fn require_secret_env(var: &str) -> Result<SecretString, RequiredSecretError> {
	load_secret_env(var)?.ok_or_else(|| RequiredSecretError::Missing {
		var: var.to_string(),
		file_var: format!("{var}_FILE"),
	})
}

#[derive(Debug, Error)]
pub enum RequiredSecretError {
	#[error("required secret not found: set either {var} or {file_var}")]
	Missing { var: String, file_var: String },

	#[error(transparent)]
	Load(#[from] SecretEnvError),
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn unset_is_none() {
		let var = "ENRICH_TEST_SECRET_UNSET_1";
		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));
		assert!(load_secret_env(var).unwrap().is_none());
	}

	#[test]
	fn inline_value_is_loaded() {
		let var = "ENRICH_TEST_SECRET_INLINE_2";
		env::remove_var(format!("{var}_FILE"));
		env::set_var(var, "inline-value");
		let secret = load_secret_env(var).unwrap().unwrap();
		assert_eq!(secret.expose(), "inline-value");
		env::remove_var(var);
	}

	#[test]
	fn empty_inline_value_is_unset() {
		let var = "ENRICH_TEST_SECRET_EMPTY_3";
		env::remove_var(format!("{var}_FILE"));
		env::set_var(var, "");
		assert!(load_secret_env(var).unwrap().is_none());
		env::remove_var(var);
	}

	#[test]
	fn file_value_wins_and_trailing_newline_is_stripped() {
		let var = "ENRICH_TEST_SECRET_FILE_4";
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "from-file").unwrap();

		env::set_var(var, "inline-value");
		env::set_var(format!("{var}_FILE"), file.path());
		let secret = load_secret_env(var).unwrap().unwrap();
		assert_eq!(secret.expose(), "from-file");

		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn missing_file_is_io_error() {
		let var = "ENRICH_TEST_SECRET_BADFILE_5";
		env::set_var(format!("{var}_FILE"), "/nonexistent/enrich/secret");
		let err = load_secret_env(var).unwrap_err();
		assert!(matches!(err, SecretEnvError::Io { .. }));
		env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn empty_file_path_is_rejected() {
		let var = "ENRICH_TEST_SECRET_EMPTYPATH_6";
		env::set_var(format!("{var}_FILE"), "  ");
		let err = load_secret_env(var).unwrap_err();
		assert!(matches!(err, SecretEnvError::EmptyPath { .. }));
		env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn require_names_both_variables() {
		let var = "ENRICH_TEST_SECRET_REQUIRED_7";
		env::remove_var(var);
		env::remove_var(format!("{var}_FILE"));
		let err = require_secret_env(var).unwrap_err();
		let message = err.to_string();
		assert!(message.contains(var));
		assert!(message.contains(&format!("{var}_FILE")));
	}
}
