#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Fetch,
    Persistance,
    Delivery,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new<T: Into<String>>(kind: ErrorKind, message: T) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn new_config<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn new_fetch<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    pub fn new_persistance<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Persistance, message)
    }

    pub fn new_delivery<T: Into<String>>(message: T) -> Self {
        Self::new(ErrorKind::Delivery, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}
