//! Scoped client sessions.

use std::ops::Deref;

use crate::error::BingxError;

/// Clients whose connection can be opened and closed.
pub trait Lifecycle {
    /// Open the connection.
    fn connect(&self) -> Result<(), BingxError>;

    /// Close the connection.
    fn close(&self);
}

/// A connected client that closes itself when dropped.
///
/// Dereferences to the client, so requests go straight through the guard.
///
/// ```rust,no_run
/// use bingx_api_client::rest::BlockingBingxClient;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BlockingBingxClient::new();
/// {
///     let session = client.session()?;
///     let contracts = session.get_swap_contracts(None)?;
///     println!("{} contracts", contracts.len());
/// }
/// assert!(!client.is_connected());
/// # Ok(())
/// # }
/// ```
#[must_use = "the client is closed as soon as the session is dropped"]
#[derive(Debug)]
pub struct Session<'a, C: Lifecycle> {
    client: &'a C,
}

impl<'a, C: Lifecycle> Session<'a, C> {
    /// Connect `client` and guard the connection.
    pub fn open(client: &'a C) -> Result<Self, BingxError> {
        client.connect()?;
        Ok(Self { client })
    }
}

impl<C: Lifecycle> Deref for Session<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.client
    }
}

impl<C: Lifecycle> Drop for Session<'_, C> {
    fn drop(&mut self) {
        self.client.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Probe {
        open: Cell<bool>,
        fail: bool,
    }

    impl Lifecycle for Probe {
        fn connect(&self) -> Result<(), BingxError> {
            if self.fail {
                return Err(BingxError::InvalidRequest("refused".into()));
            }
            self.open.set(true);
            Ok(())
        }

        fn close(&self) {
            self.open.set(false);
        }
    }

    #[test]
    fn test_session_closes_on_drop() {
        let probe = Probe::default();
        {
            let session = Session::open(&probe).unwrap();
            assert!(session.open.get());
        }
        assert!(!probe.open.get());
    }

    #[test]
    fn test_failed_connect_yields_no_session() {
        let probe = Probe {
            fail: true,
            ..Probe::default()
        };
        assert!(Session::open(&probe).is_err());
    }
}
