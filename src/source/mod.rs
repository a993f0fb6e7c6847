use crate::account::AccountSnapshot;
use crate::error::Error;

mod sequence;
pub use sequence::*;

/// One point-in-time read of every account the credential can see.
pub trait Requester {
    fn request(&self) -> Result<Vec<AccountSnapshot>, Error>;
}

pub struct NullRequester;
impl Requester for NullRequester {
    fn request(&self) -> Result<Vec<AccountSnapshot>, Error> {
        Ok(Default::default())
    }
}
