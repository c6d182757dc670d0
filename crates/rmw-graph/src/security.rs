// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lookup of DDS Security material for a participant enclave.
//!
//! An enclave's secure root directory holds a fixed set of PKI files. The
//! lookup is all-or-nothing over the required set: vendors either get every
//! handle they need to enable security, or none at all.

use std::collections::HashMap;
use std::path::Path;

const REQUIRED_FILES: [(&str, &str); 6] = [
    ("IDENTITY_CA", "identity_ca.cert.pem"),
    ("CERTIFICATE", "cert.pem"),
    ("PRIVATE_KEY", "key.pem"),
    ("PERMISSIONS_CA", "permissions_ca.cert.pem"),
    ("GOVERNANCE", "governance.p7s"),
    ("PERMISSIONS", "permissions.p7s"),
];

const OPTIONAL_FILES: [(&str, &str); 1] = [("CRL", "crl.pem")];

/// Collect the security files under `secure_root`, keyed by their role.
///
/// Each returned value is `prefix` + the file's full path; vendors use the
/// prefix for their URI scheme (e.g. `"file:"`). Returns `None` when any
/// required file is missing; optional files are included only when present.
pub fn get_security_files(
    prefix: &str,
    secure_root: &Path,
) -> Option<HashMap<String, String>> {
    let mut result = HashMap::new();

    for (key, file_name) in REQUIRED_FILES {
        let full_path = secure_root.join(file_name);
        if !full_path.is_file() {
            log::debug!(
                "[security] required file '{}' missing under {}",
                file_name,
                secure_root.display()
            );
            return None;
        }
        result.insert(key.to_string(), format!("{}{}", prefix, full_path.display()));
    }

    for (key, file_name) in OPTIONAL_FILES {
        let full_path = secure_root.join(file_name);
        if full_path.is_file() {
            result.insert(key.to_string(), format!("{}{}", prefix, full_path.display()));
        }
    }

    Some(result)
}
