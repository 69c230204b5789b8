/// Construct an ad-hoc [`HttpError`](crate::HttpError) from a status code, optional source error
/// and formatted message.
#[macro_export]
macro_rules! http_error{
    ($status_code:ident $(, source = $src:expr)? $(, message = $($arg:tt)*)?) => {{
        let http_error: $crate::HttpError
            = $crate::HttpError::from_status_code($crate::http::StatusCode::$status_code)
            $(
                .with_source_err($src)
             )?
            $(
                .with_message(std::format!($($arg)*))
             )?;
        http_error
    }};
    ($status_code:ident $(, $($arg:tt)*)?) => {
        $crate::http_error!($status_code $(, message = $($arg)*)?)
    };
}

/// Shorthand macro to return early with an [`HttpError`](crate::HttpError).
#[macro_export]
macro_rules! http_error_ret {
    ($status_code:ident $(, source = $src:expr)? $(, message = $($arg:tt)*)?) => {
        return Err($crate::http_error!($status_code $(, source = $src)? $(, message = $($arg)*)?).into())
    };
    ($status_code:ident $(, $($arg:tt)*)?) => {
        return Err($crate::http_error!($status_code $(, message = $($arg)*)?).into())
    };
}
