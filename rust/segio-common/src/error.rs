use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// A hard failure of a memory detection probe for the region
    /// `[address, address + length)`.
    pub fn detection_failed(address: usize, length: usize, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::DetectionFailed {
                address,
                length,
                message: message.into(),
            }
            .into(),
        )
    }

    /// Wraps an error raised by an external service (detection backend, driver API).
    pub fn service<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Service {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    /// Returns `true` if this is an `InvalidArgument` error.
    pub fn is_invalid_arg(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("memory detection failed for {length} bytes at {address:#x}: {message}")]
    DetectionFailed {
        address: usize,
        length: usize,
        message: String,
    },

    #[error("service error: {context}")]
    Service {
        context: String,
        source: StdErrorBoxed,
    },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn test_error_display() {
        let e = Error::invalid_arg("segments", "memory type mismatch");
        assert_eq!(
            e.to_string(),
            "invalid argument segments: memory type mismatch"
        );
        assert!(e.is_invalid_arg());

        let e = Error::detection_failed(0x1000, 64, "probe rejected");
        assert_eq!(
            e.to_string(),
            "memory detection failed for 64 bytes at 0x1000: probe rejected"
        );
        assert!(!e.is_invalid_arg());
    }

    #[test]
    fn test_service_error_keeps_source() {
        let io = std::io::Error::other("driver gone");
        let e = Error::service("cuPointerGetAttributes", io);
        match e.into_kind() {
            ErrorKind::Service { context, source } => {
                assert_eq!(context, "cuPointerGetAttributes");
                assert_eq!(source.to_string(), "driver gone");
            }
            kind => panic!("unexpected kind {kind:?}"),
        }
    }
}
