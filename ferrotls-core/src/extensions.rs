//! The extension container carried by both hello messages.

use crate::error::{Error, Result};
use crate::protocol::ExtensionType;

/// A single extension: a type tag and its opaque encoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Extension type
    pub extension_type: ExtensionType,

    /// Extension data
    pub data: Vec<u8>,
}

impl Extension {
    /// Create a new extension.
    pub fn new(extension_type: ExtensionType, data: Vec<u8>) -> Self {
        Self {
            extension_type,
            data,
        }
    }

    /// Encode the extension to bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.data.len());

        // Type (2 bytes)
        buf.extend_from_slice(&self.extension_type.to_u16().to_be_bytes());

        // Length (2 bytes)
        buf.extend_from_slice(&(self.data.len() as u16).to_be_bytes());

        // Data
        buf.extend_from_slice(&self.data);

        buf
    }

    /// Decode an extension from bytes, returning it and the bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 4 {
            return Err(Error::Decode("Extension too short".into()));
        }

        let ext_type_raw = u16::from_be_bytes([data[0], data[1]]);
        let extension_type = ExtensionType::from_u16(ext_type_raw)
            .ok_or_else(|| Error::Decode(format!("Unknown extension type: {}", ext_type_raw)))?;

        let length = u16::from_be_bytes([data[2], data[3]]) as usize;

        if data.len() < 4 + length {
            return Err(Error::Decode("Incomplete extension data".into()));
        }

        let ext_data = data[4..4 + length].to_vec();

        Ok((
            Self {
                extension_type,
                data: ext_data,
            },
            4 + length,
        ))
    }
}

/// Ordered extension list keyed by type.
///
/// Insertion order is the wire order; for ClientHello this order is
/// preference-significant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    extensions: Vec<Extension>,
}

impl Extensions {
    /// Create a new empty extension list.
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    /// Add an extension, replacing any previous entry of the same type.
    ///
    /// A replaced entry keeps its original position in the wire order.
    pub fn add(&mut self, extension: Extension) {
        if let Some(existing) = self
            .extensions
            .iter_mut()
            .find(|e| e.extension_type == extension.extension_type)
        {
            *existing = extension;
        } else {
            self.extensions.push(extension);
        }
    }

    /// Get an extension by type.
    pub fn get(&self, ext_type: ExtensionType) -> Option<&Extension> {
        self.extensions.iter().find(|e| e.extension_type == ext_type)
    }

    /// Check if an extension is present.
    pub fn has(&self, ext_type: ExtensionType) -> bool {
        self.get(ext_type).is_some()
    }

    /// Encode all extensions, prefixed with the total length.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        for ext in &self.extensions {
            buf.extend_from_slice(&ext.encode());
        }

        let mut result = Vec::with_capacity(2 + buf.len());
        result.extend_from_slice(&(buf.len() as u16).to_be_bytes());
        result.extend_from_slice(&buf);

        result
    }

    /// Decode extensions from bytes.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < 2 {
            return Err(Error::Decode("Extensions too short".into()));
        }

        let total_length = u16::from_be_bytes([data[0], data[1]]) as usize;

        if data.len() < 2 + total_length {
            return Err(Error::Decode("Incomplete extensions".into()));
        }

        let mut extensions = Vec::new();
        let mut offset = 2;

        while offset < 2 + total_length {
            let (ext, consumed) = Extension::decode(&data[offset..])?;
            extensions.push(ext);
            offset += consumed;
        }

        Ok(Self { extensions })
    }

    /// Get the number of extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Check if the extension list is empty.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
