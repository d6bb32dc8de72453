use base64::prelude::*;
use sha2::{Digest as _, Sha256};

pub(crate) fn base64url<T: ?Sized + AsRef<[u8]>>(input: &T) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input)
}

pub(crate) fn sha256_base64url<T: ?Sized + AsRef<[u8]>>(input: &T) -> String {
    base64url(&Sha256::digest(input.as_ref()))
}
