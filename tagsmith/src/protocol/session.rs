// tagsmith/src/protocol/session.rs

//! Scoped tag connection with a single reconnect.

use crate::config::RECONNECT_ATTEMPTS;
use crate::transport::traits::TagConnection;
use crate::{Error, Result};
use log::{debug, warn};
use std::ops::{Deref, DerefMut};

/// Scoped ownership of one connected tag technology.
///
/// Dropping the session always closes the connection, so every early return
/// in an operation leaves the tag closed.
pub struct Session<T: TagConnection + ?Sized> {
    tech: Box<T>,
}

impl<T: TagConnection + ?Sized> Session<T> {
    /// Close any stale connection, connect, and confirm the link is up.
    pub fn open(mut tech: Box<T>) -> Result<Self> {
        if tech.is_connected() {
            debug!("closing stale tag connection before opening a new one");
            if let Err(e) = tech.close() {
                debug!("stale close failed: {}", e);
            }
        }
        tech.connect()?;
        if !tech.is_connected() {
            return Err(Error::ConnectionLost(
                "tag did not stay connected after connect".into(),
            ));
        }
        Ok(Self { tech })
    }

    /// Whether the wrapped technology still reports a link
    pub fn is_connected(&self) -> bool {
        self.tech.is_connected()
    }

    /// Drop the current link and establish a fresh one.
    pub fn reconnect(&mut self) -> Result<()> {
        if let Err(e) = self.tech.close() {
            debug!("close before reconnect failed: {}", e);
        }
        self.tech.connect()?;
        if self.tech.is_connected() {
            Ok(())
        } else {
            Err(Error::ConnectionLost("reconnect did not restore the link".into()))
        }
    }

    /// Run `op`, reconnecting and running it again when the tag drops out.
    ///
    /// `op` receives the attempt number; anything but attempt 0 follows a
    /// fresh connection, so per-connection state (Mifare authentication)
    /// must be re-established. Only connection loss is retried.
    pub fn with_reconnect<R>(&mut self, mut op: impl FnMut(&mut T, usize) -> Result<R>) -> Result<R> {
        let mut attempt = 0;
        loop {
            let err = match op(&mut *self.tech, attempt) {
                Ok(v) => return Ok(v),
                Err(e) => e,
            };
            let lost = err.is_connection_lost() || !self.tech.is_connected();
            if !lost || attempt >= RECONNECT_ATTEMPTS {
                return Err(if lost && !err.is_connection_lost() {
                    Error::ConnectionLost(err.to_string())
                } else {
                    err
                });
            }
            warn!("tag connection lost ({}), reconnecting", err);
            self.reconnect()?;
            attempt += 1;
        }
    }
}

impl<T: TagConnection + ?Sized> Deref for Session<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.tech
    }
}

impl<T: TagConnection + ?Sized> DerefMut for Session<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.tech
    }
}

impl<T: TagConnection + ?Sized> Drop for Session<T> {
    fn drop(&mut self) {
        if let Err(e) = self.tech.close() {
            warn!("failed to close tag connection: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockNtagTag;
    use crate::transport::traits::NfcATech;

    fn blank() -> MockNtagTag {
        MockNtagTag::blank_215(&[4, 1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn drop_closes_connection() {
        let tag = blank();
        {
            let session = Session::open(Box::new(tag.clone())).unwrap();
            assert!(session.is_connected());
        }
        assert!(!tag.is_open());
        assert_eq!(tag.close_count(), 1);
    }

    #[test]
    fn open_closes_stale_connection() {
        let mut tag = blank();
        tag.connect().unwrap();
        let _session = Session::open(Box::new(tag.clone())).unwrap();
        assert_eq!(tag.close_count(), 1);
        assert_eq!(tag.connect_count(), 2);
    }

    #[test]
    fn open_fails_when_tag_gone() {
        let tag = blank();
        tag.refuse_connect(true);
        let err = Session::open(Box::new(tag.clone())).err().unwrap();
        assert!(err.is_connection_lost());
    }

    #[test]
    fn with_reconnect_retries_once() {
        let tag = blank();
        tag.drop_connection_on_write(4, 1);
        let boxed: Box<dyn NfcATech> = Box::new(tag.clone());
        let mut session = Session::open(boxed).unwrap();
        let attempts = session
            .with_reconnect(|t, attempt| {
                t.transceive(&[0xA2, 4, 1, 2, 3, 4])?;
                Ok(attempt)
            })
            .unwrap();
        assert_eq!(attempts, 1);
        assert_eq!(tag.page(4), [1, 2, 3, 4]);
        assert_eq!(tag.connect_count(), 2);
    }

    #[test]
    fn with_reconnect_gives_up_after_second_loss() {
        let tag = blank();
        tag.drop_connection_on_write(4, 2);
        let boxed: Box<dyn NfcATech> = Box::new(tag.clone());
        let mut session = Session::open(boxed).unwrap();
        let err = session
            .with_reconnect(|t, _| t.transceive(&[0xA2, 4, 1, 2, 3, 4]))
            .unwrap_err();
        assert!(err.is_connection_lost());
    }

    #[test]
    fn with_reconnect_does_not_retry_other_errors() {
        let tag = blank();
        let boxed: Box<dyn NfcATech> = Box::new(tag.clone());
        let mut session = Session::open(boxed).unwrap();
        let mut calls = 0;
        let err = session
            .with_reconnect(|_, _| -> Result<()> {
                calls += 1;
                Err(Error::TagIo("Transceive failed".into()))
            })
            .unwrap_err();
        assert!(!err.is_connection_lost());
        assert_eq!(calls, 1);
    }
}
