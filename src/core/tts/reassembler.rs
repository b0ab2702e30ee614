//! Ordered reassembly of chunk audio.

use bytes::{Bytes, BytesMut};

use super::base::{TTSError, TTSResult};
use super::dispatcher::ChunkResult;

/// Concatenate chunk audio in ascending index order.
///
/// Results may arrive in any order. The output is produced only when every
/// index in `0..chunk_count` is present exactly once with audio; otherwise
/// nothing is returned:
///
/// - an errored result fails with that error, attributed to its chunk
/// - an index outside `0..chunk_count` or a repeated index is a
///   [`TTSError::ReassemblyError`]
/// - a missing index is a [`TTSError::ReassemblyError`] naming the first gap
pub fn assemble(results: Vec<ChunkResult>, chunk_count: usize) -> TTSResult<Bytes> {
    let mut slots: Vec<Option<Bytes>> = vec![None; chunk_count];

    for ChunkResult { index, outcome } in results {
        let audio = outcome.map_err(|e| e.for_chunk(index))?;
        let slot = slots.get_mut(index).ok_or_else(|| {
            TTSError::ReassemblyError(format!(
                "chunk index {index} out of range for {chunk_count} chunks"
            ))
        })?;
        if slot.is_some() {
            return Err(TTSError::ReassemblyError(format!(
                "duplicate result for chunk {index}"
            )));
        }
        *slot = Some(audio);
    }

    let total: usize = slots.iter().flatten().map(Bytes::len).sum();
    let mut audio = BytesMut::with_capacity(total);
    for (index, slot) in slots.iter().enumerate() {
        match slot {
            Some(chunk) => audio.extend_from_slice(chunk),
            None => {
                return Err(TTSError::ReassemblyError(format!(
                    "missing result for chunk {index} of {chunk_count}"
                )));
            }
        }
    }

    Ok(audio.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_by_index() {
        let results = vec![
            ChunkResult::ok(2, "CCCC"),
            ChunkResult::ok(0, "AAAA"),
            ChunkResult::ok(1, "BBBB"),
        ];
        assert_eq!(assemble(results, 3).unwrap(), "AAAABBBBCCCC");
    }

    #[test]
    fn test_missing_index_is_error() {
        let results = vec![ChunkResult::ok(0, "a"), ChunkResult::ok(2, "c")];
        match assemble(results, 3) {
            Err(TTSError::ReassemblyError(msg)) => assert!(msg.contains("chunk 1")),
            other => panic!("Expected ReassemblyError, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_index_is_error() {
        let results = vec![ChunkResult::ok(0, "a"), ChunkResult::ok(0, "a")];
        assert!(matches!(
            assemble(results, 2),
            Err(TTSError::ReassemblyError(_))
        ));
    }

    #[test]
    fn test_out_of_range_index_is_error() {
        let results = vec![ChunkResult::ok(0, "a"), ChunkResult::ok(5, "x")];
        assert!(matches!(
            assemble(results, 2),
            Err(TTSError::ReassemblyError(_))
        ));
    }

    #[test]
    fn test_errored_result_fails_whole_assembly() {
        let results = vec![
            ChunkResult::ok(0, "a"),
            ChunkResult {
                index: 1,
                outcome: Err(TTSError::EmptyResponse),
            },
        ];
        let err = assemble(results, 2).unwrap_err();
        assert_eq!(err.chunk_index(), Some(1));
    }

    #[test]
    fn test_zero_chunks_is_empty_audio() {
        assert!(assemble(Vec::new(), 0).unwrap().is_empty());
    }
}
