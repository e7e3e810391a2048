pub mod mc_modern;

use std::io::{Read, Write};

/// A ping protocol spoken over an already connected stream.
pub trait Pinger {

    /// The data returned from a ping.
    type Data;

    /// A reported error value.
    type Error: std::error::Error;

    /// Runs the exchange. The stream is dropped, and so closed, before this
    /// returns on every path.
    fn ping<S: Read + Write>(&self, stream: S) -> std::result::Result<Self::Data, Self::Error>;
}
