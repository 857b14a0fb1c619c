pub mod database_lib;
pub mod token_lib;
pub mod x_request_id;

/// Unwrap the Ok side of a WebResponse or leave the routine with the
/// transformed error
#[macro_export]
macro_rules! try_or_return {
    ($result:expr, $error_transform:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => return $error_transform(e),
        }
    };
}
