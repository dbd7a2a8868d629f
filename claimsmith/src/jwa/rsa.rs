//! RSA key material
//!
//! Public keys are read from X.509 certificates and private keys from PKCS#1
//! PEM documents. Either can be read from a [`FileSystem`], which defaults
//! to the operating system's.

use std::path::Path;

use crate::{error, fs::FileSystem};

mod private;
mod public;

pub use private::PrivateKey;
pub use public::PublicKey;

fn read_key_file<F: FileSystem>(fs: &F, path: &Path) -> Result<Vec<u8>, error::KeyLoadError> {
    fs.read(path)
        .map_err(|e| error::key_file_unreadable(path, e))
}
