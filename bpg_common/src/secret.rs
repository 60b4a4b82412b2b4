use std::{
    fmt,
    fmt::{Debug, Display},
};

/// A wrapper for secret values that redacts the value in `Debug` and `Display` output.
///
/// The gateway carries node RPC passwords in its config objects, and those objects get logged at startup. Wrapping
/// the credential makes the log line safe:
///
/// ```
/// use bpg_common::Secret;
///
/// let rpc_pass = Secret::new("hunter2".to_string());
/// assert_eq!(format!("connecting as electrum:{rpc_pass}"), "connecting as electrum:****");
/// assert_eq!(rpc_pass.reveal(), "hunter2");
/// ```
///
/// The only ways to read the value are an explicit [`Secret::reveal`] or [`Secret::into_inner`] call.
#[derive(Clone, Default)]
pub struct Secret<T> {
    value: T,
}

impl<T> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    pub fn reveal(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<T> Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}
