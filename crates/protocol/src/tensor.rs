//! Tagged numeric array encoding
//!
//! Entries may carry fixed-width numeric arrays (weight matrices, metric
//! vectors) that have no faithful plain-JSON form. They are encoded as a
//! tagged object instead, marked by the reserved `__ndarray__` key:
//!
//! ```json
//! {"descr": "<f8", "fortran_order": false, "shape": [2, 3], "__ndarray__": "..."}
//! ```
//!
//! `descr` names the element type, `shape` the dimensions, `fortran_order`
//! whether the raw bytes are column-major, and `__ndarray__` the raw
//! little-endian bytes in base64. Decoding restores the array with element
//! type, shape, memory order, and values intact.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{Map, Value};

use crate::error::ProtocolError;
use crate::Result;

/// Reserved key marking a JSON object as a tagged numeric array
pub const NDARRAY_KEY: &str = "__ndarray__";

/// Element types a tensor can carry
///
/// Wire names follow the `<kind><bytes>` convention: `<` prefixes
/// little-endian multi-byte types, `|` prefixes single-byte types.
/// Big-endian data is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    F64,
    F32,
    I64,
    I32,
    I16,
    I8,
    U64,
    U32,
    U16,
    U8,
    Bool,
}

impl DType {
    /// The wire name for this element type
    pub fn descr(&self) -> &'static str {
        match self {
            DType::F64 => "<f8",
            DType::F32 => "<f4",
            DType::I64 => "<i8",
            DType::I32 => "<i4",
            DType::I16 => "<i2",
            DType::I8 => "|i1",
            DType::U64 => "<u8",
            DType::U32 => "<u4",
            DType::U16 => "<u2",
            DType::U8 => "|u1",
            DType::Bool => "|b1",
        }
    }

    /// Parse a wire name
    ///
    /// Single-byte types are accepted with either prefix; big-endian
    /// names are rejected.
    pub fn from_descr(descr: &str) -> Result<Self> {
        let dtype = match descr {
            "<f8" => DType::F64,
            "<f4" => DType::F32,
            "<i8" => DType::I64,
            "<i4" => DType::I32,
            "<i2" => DType::I16,
            "|i1" | "<i1" => DType::I8,
            "<u8" => DType::U64,
            "<u4" => DType::U32,
            "<u2" => DType::U16,
            "|u1" | "<u1" => DType::U8,
            "|b1" | "<b1" => DType::Bool,
            other => {
                return Err(ProtocolError::array(format!(
                    "unsupported dtype {other:?}"
                )))
            }
        };
        Ok(dtype)
    }

    /// Size of one element in bytes
    pub fn size(&self) -> usize {
        match self {
            DType::F64 | DType::I64 | DType::U64 => 8,
            DType::F32 | DType::I32 | DType::U32 => 4,
            DType::I16 | DType::U16 => 2,
            DType::I8 | DType::U8 | DType::Bool => 1,
        }
    }
}

/// Primitive types that can back a [`Tensor`]
pub trait Element: Copy {
    /// The dtype tag for this element type
    const DTYPE: DType;

    /// Append the little-endian bytes of `self`
    fn write_le(self, out: &mut Vec<u8>);

    /// Read one value from its little-endian bytes
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = $dtype;

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_element! {
    f64 => DType::F64,
    f32 => DType::F32,
    i64 => DType::I64,
    i32 => DType::I32,
    i16 => DType::I16,
    i8 => DType::I8,
    u64 => DType::U64,
    u32 => DType::U32,
    u16 => DType::U16,
    u8 => DType::U8,
}

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// A fixed-width numeric array
///
/// Stored as raw bytes plus the metadata needed to reconstruct the array:
/// element type, shape, and memory order. Constructors produce row-major
/// data; `fortran_order` is carried so column-major input survives a round
/// trip unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    dtype: DType,
    shape: Vec<usize>,
    fortran_order: bool,
    data: Vec<u8>,
}

impl Tensor {
    /// Build a tensor from a flat slice in row-major order
    ///
    /// The number of values must match the product of `shape`.
    pub fn from_slice<T: Element>(shape: &[usize], values: &[T]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(ProtocolError::array(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        let mut data = Vec::with_capacity(values.len() * T::DTYPE.size());
        for value in values {
            value.write_le(&mut data);
        }
        Ok(Self {
            dtype: T::DTYPE,
            shape: shape.to_vec(),
            fortran_order: false,
            data,
        })
    }

    /// Build a rank-zero tensor from a single value
    pub fn scalar<T: Element>(value: T) -> Self {
        let mut data = Vec::with_capacity(T::DTYPE.size());
        value.write_le(&mut data);
        Self {
            dtype: T::DTYPE,
            shape: Vec::new(),
            fortran_order: false,
            data,
        }
    }

    /// Build a tensor from raw little-endian bytes
    ///
    /// `data` must hold exactly the element count implied by `shape` times
    /// the element size. Pass `fortran_order = true` for bytes that are
    /// already column-major.
    pub fn from_raw(
        dtype: DType,
        shape: Vec<usize>,
        fortran_order: bool,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected = shape.iter().product::<usize>() * dtype.size();
        if data.len() != expected {
            return Err(ProtocolError::array(format!(
                "shape {:?} with dtype {} needs {} bytes, got {}",
                shape,
                dtype.descr(),
                expected,
                data.len()
            )));
        }
        Ok(Self {
            dtype,
            shape,
            fortran_order,
            data,
        })
    }

    /// Element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Dimensions, outermost first
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Whether the raw bytes are column-major
    #[inline]
    pub fn fortran_order(&self) -> bool {
        self.fortran_order
    }

    /// Number of elements (1 for a rank-zero tensor)
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the tensor has no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw little-endian bytes in storage order
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Copy the elements out as a typed vector
    ///
    /// Fails when `T` does not match the stored element type. Values come
    /// back in storage order.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::DTYPE != self.dtype {
            return Err(ProtocolError::array(format!(
                "tensor holds {}, requested {}",
                self.dtype.descr(),
                T::DTYPE.descr()
            )));
        }
        let size = self.dtype.size();
        Ok(self.data.chunks_exact(size).map(T::read_le).collect())
    }

    /// Whether a JSON value is a tagged numeric array
    pub fn is_tagged(value: &Value) -> bool {
        value
            .as_object()
            .is_some_and(|obj| obj.contains_key(NDARRAY_KEY))
    }

    /// Encode as the tagged JSON object
    pub fn to_value(&self) -> Value {
        let mut repr = Map::with_capacity(4);
        repr.insert("descr".into(), Value::from(self.dtype.descr()));
        repr.insert("fortran_order".into(), Value::from(self.fortran_order));
        let dims: Vec<u64> = self.shape.iter().map(|&d| d as u64).collect();
        repr.insert("shape".into(), Value::from(dims));
        repr.insert(NDARRAY_KEY.into(), Value::from(BASE64.encode(&self.data)));
        Value::Object(repr)
    }

    /// Decode a tagged JSON object back into a tensor
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .filter(|obj| obj.contains_key(NDARRAY_KEY))
            .ok_or_else(|| ProtocolError::array("value is not a tagged array"))?;
        let descr = obj
            .get("descr")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::array("tagged array missing descr"))?;
        let dtype = DType::from_descr(descr)?;
        let fortran_order = obj
            .get("fortran_order")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let shape = obj
            .get("shape")
            .and_then(Value::as_array)
            .ok_or_else(|| ProtocolError::array("tagged array missing shape"))?
            .iter()
            .map(|dim| {
                dim.as_u64()
                    .map(|d| d as usize)
                    .ok_or_else(|| ProtocolError::array("non-integer dimension in shape"))
            })
            .collect::<Result<Vec<_>>>()?;
        let encoded = obj
            .get(NDARRAY_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::array("array payload is not a string"))?;
        let data = BASE64
            .decode(encoded)
            .map_err(|e| ProtocolError::array(format!("bad base64 payload: {e}")))?;
        Self::from_raw(dtype, shape, fortran_order, data)
    }
}
