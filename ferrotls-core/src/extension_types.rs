//! Typed extensions with encoding/decoding support.
//!
//! The container in [`crate::extensions`] stores opaque payloads; this module
//! provides the strongly-typed views the drivers negotiate with. Lookup by
//! decode fails if a payload is present but malformed.

use crate::error::{Error, Result};
use crate::extensions::{Extension, Extensions};
use crate::protocol::{
    ExtensionType, HashAlgorithmId, SignatureAlgorithmId, SignatureAndHashAlgorithm,
};
use bytes::{BufMut, BytesMut};
use ferrotls_crypto::KeyExchangeAlgorithm;

/// Key share entry: a named group and its public-key bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyShareEntry {
    /// Named group
    pub group: KeyExchangeAlgorithm,

    /// Public key bytes (uncompressed SEC1 point)
    pub key_exchange: Vec<u8>,
}

/// Typed extension enum over the extensions this profile negotiates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedExtension {
    /// Server Name Indication: the target host name.
    ServerName(String),

    /// Ordered list of supported key-exchange groups.
    SupportedGroups(Vec<KeyExchangeAlgorithm>),

    /// Ordered list of (hash, signature) algorithm pairs.
    SignatureAlgorithms(Vec<SignatureAndHashAlgorithm>),

    /// Key shares. A client offers many; a server selects exactly one.
    KeyShare(Vec<KeyShareEntry>),
}

impl TypedExtension {
    /// Encode a typed extension to wire format.
    pub fn encode(&self) -> Result<Extension> {
        let (ext_type, data) = match self {
            TypedExtension::ServerName(name) => {
                let mut buf = BytesMut::new();
                // server_name_list length
                let list_len = 3 + name.len(); // 1 (type) + 2 (length) + name
                buf.put_u16(list_len as u16);
                // NameType (host_name = 0)
                buf.put_u8(0);
                // HostName length + bytes
                buf.put_u16(name.len() as u16);
                buf.put_slice(name.as_bytes());
                (ExtensionType::ServerName, buf.to_vec())
            },

            TypedExtension::SupportedGroups(groups) => {
                let mut buf = BytesMut::new();
                buf.put_u16((groups.len() * 2) as u16);
                for group in groups {
                    buf.put_u16(group.to_u16());
                }
                (ExtensionType::SupportedGroups, buf.to_vec())
            },

            TypedExtension::SignatureAlgorithms(algorithms) => {
                let mut buf = BytesMut::new();
                buf.put_u16((algorithms.len() * 2) as u16);
                for alg in algorithms {
                    buf.put_u8(alg.hash.to_u8());
                    buf.put_u8(alg.signature.to_u8());
                }
                (ExtensionType::SignatureAlgorithms, buf.to_vec())
            },

            TypedExtension::KeyShare(entries) => {
                let mut entries_buf = BytesMut::new();
                for entry in entries {
                    entries_buf.put_u16(entry.group.to_u16());
                    entries_buf.put_u16(entry.key_exchange.len() as u16);
                    entries_buf.put_slice(&entry.key_exchange);
                }

                let mut buf = BytesMut::new();
                buf.put_u16(entries_buf.len() as u16);
                buf.put_slice(&entries_buf);

                (ExtensionType::KeyShare, buf.to_vec())
            },
        };

        Ok(Extension::new(ext_type, data))
    }

    /// Decode a typed extension from wire format.
    pub fn decode(extension: &Extension) -> Result<Self> {
        let data = &extension.data;

        match extension.extension_type {
            ExtensionType::ServerName => {
                if data.len() < 5 {
                    return Err(Error::Decode("ServerName extension too short".into()));
                }
                let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
                if data.len() < 2 + list_len || list_len < 3 {
                    return Err(Error::Decode("ServerName list truncated".into()));
                }

                let name_type = data[2];
                if name_type != 0 {
                    return Err(Error::Decode("Unsupported name type".into()));
                }

                let name_len = u16::from_be_bytes([data[3], data[4]]) as usize;
                if data.len() < 5 + name_len {
                    return Err(Error::Decode("ServerName data truncated".into()));
                }

                let name = String::from_utf8(data[5..5 + name_len].to_vec())
                    .map_err(|_| Error::Decode("Invalid UTF-8 in server name".into()))?;

                Ok(TypedExtension::ServerName(name))
            },

            ExtensionType::SupportedGroups => {
                if data.len() < 2 {
                    return Err(Error::Decode("SupportedGroups too short".into()));
                }
                let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
                if list_len % 2 != 0 {
                    return Err(Error::Decode("Invalid group list length".into()));
                }
                if data.len() < 2 + list_len {
                    return Err(Error::Decode("SupportedGroups truncated".into()));
                }

                let mut groups = Vec::new();
                for i in (2..2 + list_len).step_by(2) {
                    let group_u16 = u16::from_be_bytes([data[i], data[i + 1]]);
                    if let Some(group) = KeyExchangeAlgorithm::from_u16(group_u16) {
                        groups.push(group);
                    }
                    // Unknown groups are skipped, not fatal
                }

                Ok(TypedExtension::SupportedGroups(groups))
            },

            ExtensionType::SignatureAlgorithms => {
                if data.len() < 2 {
                    return Err(Error::Decode("SignatureAlgorithms too short".into()));
                }
                let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
                if list_len % 2 != 0 {
                    return Err(Error::Decode("Invalid algorithm list length".into()));
                }
                if data.len() < 2 + list_len {
                    return Err(Error::Decode("SignatureAlgorithms truncated".into()));
                }

                let mut algorithms = Vec::new();
                for i in (2..2 + list_len).step_by(2) {
                    let hash = HashAlgorithmId::from_u8(data[i]);
                    let signature = SignatureAlgorithmId::from_u8(data[i + 1]);
                    if let (Some(hash), Some(signature)) = (hash, signature) {
                        algorithms.push(SignatureAndHashAlgorithm { hash, signature });
                    }
                }

                Ok(TypedExtension::SignatureAlgorithms(algorithms))
            },

            ExtensionType::KeyShare => {
                if data.len() < 4 {
                    return Err(Error::Decode("KeyShare too short".into()));
                }

                // ServerHello carries a single entry without a list prefix;
                // ClientHello carries a length-prefixed list. Disambiguate by
                // checking whether the single-entry reading consumes the
                // payload exactly.
                let possible_group = u16::from_be_bytes([data[0], data[1]]);
                let possible_key_len = u16::from_be_bytes([data[2], data[3]]) as usize;

                if KeyExchangeAlgorithm::from_u16(possible_group).is_some()
                    && data.len() == 4 + possible_key_len
                {
                    let group = KeyExchangeAlgorithm::from_u16(possible_group)
                        .ok_or_else(|| Error::Decode("Unknown key share group".into()))?;
                    let key_exchange = data[4..4 + possible_key_len].to_vec();

                    return Ok(TypedExtension::KeyShare(vec![KeyShareEntry {
                        group,
                        key_exchange,
                    }]));
                }

                let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
                if data.len() < 2 + list_len {
                    return Err(Error::Decode("KeyShare truncated".into()));
                }

                let mut entries = Vec::new();
                let mut offset = 2;

                while offset < 2 + list_len {
                    if offset + 4 > data.len() {
                        return Err(Error::Decode("KeyShare entry truncated".into()));
                    }

                    let group_u16 = u16::from_be_bytes([data[offset], data[offset + 1]]);
                    let key_len =
                        u16::from_be_bytes([data[offset + 2], data[offset + 3]]) as usize;

                    if offset + 4 + key_len > data.len() {
                        return Err(Error::Decode("KeyShare key data truncated".into()));
                    }

                    if let Some(group) = KeyExchangeAlgorithm::from_u16(group_u16) {
                        entries.push(KeyShareEntry {
                            group,
                            key_exchange: data[offset + 4..offset + 4 + key_len].to_vec(),
                        });
                    }

                    offset += 4 + key_len;
                }

                Ok(TypedExtension::KeyShare(entries))
            },
        }
    }
}

/// Typed accessors on the extension container.
impl Extensions {
    /// Add a typed extension to the list.
    pub fn add_typed(&mut self, typed_ext: TypedExtension) -> Result<()> {
        let ext = typed_ext.encode()?;
        self.add(ext);
        Ok(())
    }

    /// Get a typed extension from the list.
    ///
    /// Returns `Ok(None)` if the type tag is absent and an error if the
    /// stored payload does not decode as the tagged type.
    pub fn get_typed(&self, ext_type: ExtensionType) -> Result<Option<TypedExtension>> {
        if let Some(ext) = self.get(ext_type) {
            Ok(Some(TypedExtension::decode(ext)?))
        } else {
            Ok(None)
        }
    }

    /// Get the server name from the SNI extension.
    pub fn get_server_name(&self) -> Result<Option<String>> {
        if let Some(TypedExtension::ServerName(name)) = self.get_typed(ExtensionType::ServerName)? {
            Ok(Some(name))
        } else {
            Ok(None)
        }
    }

    /// Get the supported groups.
    pub fn get_supported_groups(&self) -> Result<Option<Vec<KeyExchangeAlgorithm>>> {
        if let Some(TypedExtension::SupportedGroups(groups)) =
            self.get_typed(ExtensionType::SupportedGroups)?
        {
            Ok(Some(groups))
        } else {
            Ok(None)
        }
    }

    /// Get the signature algorithm pairs.
    pub fn get_signature_algorithms(&self) -> Result<Option<Vec<SignatureAndHashAlgorithm>>> {
        if let Some(TypedExtension::SignatureAlgorithms(algorithms)) =
            self.get_typed(ExtensionType::SignatureAlgorithms)?
        {
            Ok(Some(algorithms))
        } else {
            Ok(None)
        }
    }

    /// Get the key share entries.
    pub fn get_key_share(&self) -> Result<Option<Vec<KeyShareEntry>>> {
        if let Some(TypedExtension::KeyShare(entries)) = self.get_typed(ExtensionType::KeyShare)? {
            Ok(Some(entries))
        } else {
            Ok(None)
        }
    }
}
