//! Container reading: header, blocks, binary decoding, and the pull
//! pipeline that assembles rows into a table.

mod block;
mod header;
mod row;
mod stream;

pub mod decode;
pub mod varint;

pub use block::{Block, BlockReader, DecodedBlock};
pub use decode::AvroValue;
pub use header::{Header, AVRO_MAGIC};
pub use row::RowDecoder;
pub use stream::TableReader;
