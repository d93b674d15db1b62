use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::{ready, Stream};
use hyper::Body;
use pin_project_lite::pin_project;
use sha1::{Digest, Sha1};
use sha1::digest::consts::U20;
use sha1::digest::generic_array::GenericArray;
use tracing::trace;

pin_project! {
    /// A download body that is checked against the checksums a server announced for it, without
    ///  holding the whole body in memory.
    ///
    /// Chunks are passed through as they arrive. When the wrapped body is drained, the validator runs
    ///  and a failed check is reported as one final error item; after an error the stream keeps
    ///  returning errors and never polls the wrapped body again. Consumers that write chunks to a
    ///  file therefore see the failure before they commit the file.
    pub struct ValidatingHttpBody {
        #[pin]
        http_body: Body,
        validator: Box<dyn HttpBodyValidator>,
        is_failed: bool,
    }
}
impl ValidatingHttpBody {
    pub fn new(http_body: Body, validator: impl HttpBodyValidator + 'static) -> ValidatingHttpBody {
        ValidatingHttpBody {
            http_body,
            validator: Box::new(validator),
            is_failed: false,
        }
    }
}

impl Stream for ValidatingHttpBody {
    type Item = anyhow::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.is_failed {
            return Poll::Ready(Some(Err(anyhow::Error::msg("polling from failed stream"))));
        }

        let this = self.project();
        let inner = ready!(this.http_body.poll_next(cx));
        match inner {
            Some(Ok(data)) => {
                // available data from the wrapped HTTP body -> pass this on
                this.validator.add_data(&data);
                Poll::Ready(Some(Ok(data)))
            }
            None => {
                // wrapped HTTP body is fully drained -> finalize validation
                match this.validator.validate() {
                    Ok(()) => Poll::Ready(None),
                    Err(e) => {
                        *this.is_failed = true;
                        Poll::Ready(Some(Err(e)))
                    }
                }
            }
            Some(Err(e)) => {
                *this.is_failed = true;
                Poll::Ready(Some(Err(e.into())))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.http_body.size_hint()
    }
}

pub trait HttpBodyValidator: Send {
    fn add_data(&mut self, data: &Bytes);
    fn validate(&self) -> anyhow::Result<()>;
}

/// all validators see all data, and all of them have to succeed
impl HttpBodyValidator for Vec<Box<dyn HttpBodyValidator>> {
    fn add_data(&mut self, data: &Bytes) {
        for validator in self.iter_mut() {
            validator.add_data(data);
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        self.iter()
            .try_for_each(|v| v.validate())
    }
}

pub struct Sha1HttpBodyValidator {
    hasher: Sha1,
    expected_hash: GenericArray<u8, U20>,
}
impl Sha1HttpBodyValidator {
    pub fn new(expected_hash: [u8; 20]) -> Sha1HttpBodyValidator {
        Sha1HttpBodyValidator {
            hasher: Default::default(),
            expected_hash: expected_hash.into(),
        }
    }
}
impl HttpBodyValidator for Sha1HttpBodyValidator {
    fn add_data(&mut self, data: &Bytes) {
        self.hasher.update(data);
    }

    fn validate(&self) -> anyhow::Result<()> {
        let hash = self.hasher.clone().finalize();
        trace!("validating SHA1 hash");
        if hash == self.expected_hash {
            Ok(())
        }
        else {
            Err(anyhow::anyhow!("SHA1 mismatch: expected {}, got {}", hex::encode(self.expected_hash), hex::encode(hash)))
        }
    }
}

pub struct Md5HttpBodyValidator {
    context: md5::Context,
    expected_hash: [u8; 16],
}
impl Md5HttpBodyValidator {
    pub fn new(expected_hash: [u8; 16]) -> Md5HttpBodyValidator {
        Md5HttpBodyValidator {
            context: md5::Context::new(),
            expected_hash,
        }
    }
}
impl HttpBodyValidator for Md5HttpBodyValidator {
    fn add_data(&mut self, data: &Bytes) {
        self.context.consume(data);
    }

    fn validate(&self) -> anyhow::Result<()> {
        let hash: [u8;16] = self.context.clone()
            .compute()
            .into();
        trace!("validating MD5 hash");
        if hash == self.expected_hash {
            Ok(())
        }
        else {
            Err(anyhow::anyhow!("MD5 mismatch: expected {}, got {}", hex::encode(self.expected_hash), hex::encode(hash)))
        }
    }
}
