//! Shared fixtures: hand-assembled Avro object container files.

use avrotable::reader::varint::encode_zigzag;
use avrotable::reader::AVRO_MAGIC;

pub const SYNC: [u8; 16] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54, 0x32,
    0x10,
];

pub const PERSON_SCHEMA: &str = r#"{
    "type": "record",
    "name": "Person",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "name", "type": "string"},
        {"name": "age", "type": "long"}
    ]
}"#;

/// Assembles container bytes block by block.
pub struct ContainerBuilder {
    schema_json: String,
    codec: Option<String>,
    blocks: Vec<(usize, Vec<u8>)>,
}

impl ContainerBuilder {
    pub fn new(schema_json: &str) -> Self {
        Self {
            schema_json: schema_json.to_string(),
            codec: None,
            blocks: Vec::new(),
        }
    }

    pub fn codec(mut self, name: &str) -> Self {
        self.codec = Some(name.to_string());
        self
    }

    /// Add a block with an already-encoded (and, if a codec is set,
    /// already-compressed) payload.
    pub fn block(mut self, row_count: usize, payload: Vec<u8>) -> Self {
        self.blocks.push((row_count, payload));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&AVRO_MAGIC);

        let entries = 1 + usize::from(self.codec.is_some());
        out.extend(encode_zigzag(entries as i64));

        push_meta(&mut out, "avro.schema", self.schema_json.as_bytes());
        if let Some(codec) = &self.codec {
            push_meta(&mut out, "avro.codec", codec.as_bytes());
        }

        out.push(0x00); // end of metadata map
        out.extend_from_slice(&SYNC);

        for (row_count, payload) in self.blocks {
            out.extend(encode_zigzag(row_count as i64));
            out.extend(encode_zigzag(payload.len() as i64));
            out.extend_from_slice(&payload);
            out.extend_from_slice(&SYNC);
        }
        out
    }
}

fn push_meta(out: &mut Vec<u8>, key: &str, value: &[u8]) {
    out.extend(encode_zigzag(key.len() as i64));
    out.extend_from_slice(key.as_bytes());
    out.extend(encode_zigzag(value.len() as i64));
    out.extend_from_slice(value);
}

pub fn encode_string(out: &mut Vec<u8>, s: &str) {
    out.extend(encode_zigzag(s.len() as i64));
    out.extend_from_slice(s.as_bytes());
}

/// Encode one Person row in wire order.
pub fn encode_person(id: i64, name: &str, age: i64) -> Vec<u8> {
    let mut out = encode_zigzag(id);
    encode_string(&mut out, name);
    out.extend(encode_zigzag(age));
    out
}

/// The canonical three-row fixture: (1, Alice, 20), (2, Bob, 30),
/// (3, Alex, 40) in a single block.
pub fn person_container() -> Vec<u8> {
    let payload = [
        encode_person(1, "Alice", 20),
        encode_person(2, "Bob", 30),
        encode_person(3, "Alex", 40),
    ]
    .concat();
    ContainerBuilder::new(PERSON_SCHEMA).block(3, payload).build()
}
