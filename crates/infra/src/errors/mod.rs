mod conversions;

pub(crate) use conversions::{client_build_error, IntoFetchError};
