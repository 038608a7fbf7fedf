//! Consistent-overhead byte stuffing.
//!
//! Frames a byte buffer so the output contains no zero bytes, followed
//! by one zero terminator. Independent of the interpreter; useful for
//! shipping scripts or blobs over zero-delimited transports.

/// Encode `data` into a zero-free buffer plus a trailing zero
/// terminator.
///
/// Worst-case output is `n + n/254 + 2` bytes: one group code per 254
/// data bytes plus the terminator.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 254 + 2);
    let mut block_start = out.len();
    out.push(0);
    let mut code: u8 = 1;
    for &b in data {
        if code == 0xff {
            // Group full: close it and start the next one.
            out[block_start] = code;
            block_start = out.len();
            out.push(0);
            code = 1;
        }
        if b == 0 {
            out[block_start] = code;
            block_start = out.len();
            out.push(0);
            code = 1;
        } else {
            out.push(b);
            code += 1;
        }
    }
    out[block_start] = code;
    out.push(0);
    out
}

/// Decode a COBS-encoded buffer back into the original bytes.
///
/// A trailing zero terminator is accepted and stripped. Returns `None`
/// for malformed input: a zero group code, or a group overrunning the
/// buffer.
pub fn decode(data: &[u8]) -> Option<Vec<u8>> {
    let mut data = data;
    if data.last() == Some(&0) {
        data = &data[..data.len() - 1];
    }
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        let code = data[i] as usize;
        if code == 0 {
            return None;
        }
        i += 1;
        let end = i + code - 1;
        if end > data.len() {
            return None;
        }
        out.extend_from_slice(&data[i..end]);
        i = end;
        if code != 0xff && i < data.len() {
            out.push(0);
        }
    }
    Some(out)
}
