//! E2SM HelloWorld indication message

use crate::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerError, PerResult};

/// E2SM-HelloWorld-IndicationMessage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelloWorldIndicationMessage {
    /// indicationMessage-Format1 carrying the raw HW-Message octets
    Format1 { message: Vec<u8> },
    Unknown { extension_index: usize },
}

impl HelloWorldIndicationMessage {
    pub fn format1(message: impl Into<Vec<u8>>) -> Self {
        Self::Format1 {
            message: message.into(),
        }
    }

    /// The message octets, if this is a Format1 indication.
    pub fn message(&self) -> Option<&[u8]> {
        match self {
            Self::Format1 { message } => Some(message),
            Self::Unknown { .. } => None,
        }
    }
}

impl AperEncode for HelloWorldIndicationMessage {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        match self {
            Self::Format1 { message } => {
                encoder.encode_choice_index(0, 1, true)?;
                encoder.encode_sequence_preamble(true, &[]);
                encoder.encode_octet_string(message, None)
            }
            Self::Unknown { extension_index } => Err(PerError::InvalidChoiceIndex {
                index: *extension_index,
                max: 0,
            }),
        }
    }
}

impl AperDecode for HelloWorldIndicationMessage {
    fn decode_aper(decoder: &mut AperDecoder) -> PerResult<Self> {
        match decoder.decode_choice_index(1, true)? {
            0 => {
                let (extended, _) = decoder.decode_sequence_preamble(true, 0)?;
                let message = decoder.decode_octet_string(None)?;
                if extended {
                    decoder.skip_extension_additions()?;
                }
                Ok(Self::Format1 { message })
            }
            index => {
                decoder.skip_open_type()?;
                Ok(Self::Unknown {
                    extension_index: index - 1,
                })
            }
        }
    }
}
