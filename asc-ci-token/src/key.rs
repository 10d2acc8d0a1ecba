use std::{
    fs, io,
    path::{Path, PathBuf},
};

use jsonwebtoken::{encode, errors::Error as JsonwebtokenError, Algorithm, EncodingKey, Header};

/// ES256 private key (`AuthKey_<KEY_ID>.p8`) used to sign credentials.
///
/// Lives for one process invocation. `Debug` does not print key material.
#[derive(Clone)]
pub struct SigningKey {
    inner: EncodingKey,
}

impl SigningKey {
    pub fn from_pem(p8_bytes: impl AsRef<[u8]>) -> Result<Self, KeyLoadError> {
        let inner =
            EncodingKey::from_ec_pem(p8_bytes.as_ref()).map_err(KeyLoadError::Malformed)?;

        // from_ec_pem accepts any curve, only a P-256 key can sign ES256
        encode(&Header::new(Algorithm::ES256), &(), &inner).map_err(KeyLoadError::Malformed)?;

        Ok(Self { inner })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KeyLoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => KeyLoadError::NotFound(path.to_owned()),
            _ => KeyLoadError::ReadFailed(path.to_owned(), err),
        })?;

        Self::from_pem(bytes)
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.inner
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SigningKey").finish_non_exhaustive()
    }
}

//
#[derive(Debug)]
pub enum KeyLoadError {
    NotFound(PathBuf),
    ReadFailed(PathBuf, io::Error),
    Malformed(JsonwebtokenError),
}
impl core::fmt::Display for KeyLoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "signing key not found at {}", path.display()),
            Self::ReadFailed(path, err) => {
                write!(f, "signing key at {} is unreadable: {err}", path.display())
            }
            Self::Malformed(err) => write!(f, "signing key is not an EC PEM key: {err}"),
        }
    }
}
impl std::error::Error for KeyLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::ReadFailed(_, err) => Some(err),
            Self::Malformed(err) => Some(err),
        }
    }
}
