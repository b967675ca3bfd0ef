//! Flat-file format for [`KnowledgeTree`]
//!
//! Nodes are written in preorder, one record per node:
//!
//! ```text
//! record   := 'A' text '\n'
//!           | 'Q' text '\n' record(no) record(yes)
//! ```
//!
//! There are no counts, lengths or brackets. The tag alone says how many subtrees
//! follow (two for `Q`, none for `A`). The reader enforces a maximum line length,
//! checks for end of input before every record and rejects anything after the root's
//! last subtree.

use std::io::{BufRead, Read, Write};

use tracing::{debug, instrument};

use super::error::{CodecError, CodecResult, DomainError};
use super::tree::{KnowledgeTree, NodeId, TreeBuilder};

pub const TAG_QUESTION: u8 = b'Q';
pub const TAG_ANIMAL: u8 = b'A';
pub const LINE_TERMINATOR: u8 = b'\n';

/// Longest accepted text line, terminator excluded.
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Encoder/decoder for the tree format, parameterized by the line length bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    max_line_len: usize,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl Codec {
    pub fn new(max_line_len: usize) -> Self {
        Self { max_line_len }
    }

    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    /// Writes `tree` in preorder (node, `no` subtree, `yes` subtree).
    ///
    /// Lines are checked against the bound before anything is written, so a tree this
    /// codec could not read back is never emitted.
    #[instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
    pub fn encode<W: Write>(&self, tree: &KnowledgeTree, mut writer: W) -> CodecResult<()> {
        let mut offset = 0u64;
        for (_, node) in tree.iter() {
            if node.text().len() > self.max_line_len {
                return Err(CodecError::LineTooLong {
                    limit: self.max_line_len,
                    offset,
                });
            }
            offset += node.text().len() as u64 + 2;
        }

        for (_, node) in tree.iter() {
            let tag = if node.is_question() {
                TAG_QUESTION
            } else {
                TAG_ANIMAL
            };
            writer
                .write_all(&[tag])
                .and_then(|()| writer.write_all(node.text().as_bytes()))
                .and_then(|()| writer.write_all(&[LINE_TERMINATOR]))
                .map_err(CodecError::Write)?;
        }
        writer.flush().map_err(CodecError::Write)?;
        debug!("encoded {} bytes", offset);
        Ok(())
    }

    pub fn encode_to_vec(&self, tree: &KnowledgeTree) -> CodecResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(tree, &mut buf)?;
        Ok(buf)
    }

    /// Parses one complete tree from `reader`.
    ///
    /// Children are decoded before their parent and assembled bottom-up, with an
    /// explicit stack of open questions instead of recursion. Any error discards
    /// everything read so far.
    #[instrument(level = "debug", skip_all)]
    pub fn decode<R: BufRead>(&self, reader: R) -> CodecResult<KnowledgeTree> {
        let mut stream = RecordReader::new(reader, self.max_line_len);
        let mut builder = TreeBuilder::new();
        let mut open: Vec<OpenQuestion> = Vec::new();

        loop {
            let offset = stream.offset;
            let tag = match stream.next_tag()? {
                Some(tag) => tag,
                None if open.is_empty() => {
                    return Err(CodecError::corrupt(offset, "no tree data"));
                }
                None => {
                    return Err(CodecError::corrupt(
                        offset,
                        "stream ends before every question has two subtrees",
                    ));
                }
            };

            let mut complete = match tag {
                TAG_ANIMAL => {
                    let text = stream.read_line()?;
                    builder.leaf(text).map_err(|e| invalid(offset, e))?
                }
                TAG_QUESTION => {
                    let text = stream.read_line()?;
                    open.push(OpenQuestion {
                        text,
                        offset,
                        no: None,
                    });
                    continue;
                }
                other => return Err(CodecError::UnknownTag { tag: other, offset }),
            };

            // hand the finished subtree to the innermost open question
            loop {
                let Some(parent) = open.last_mut() else {
                    if !stream.at_end()? {
                        return Err(CodecError::corrupt(
                            stream.offset,
                            "unexpected data after the end of the tree",
                        ));
                    }
                    let tree = builder.finish(complete).map_err(|e| invalid(0, e))?;
                    debug!("decoded {} nodes from {} bytes", tree.len(), stream.offset);
                    return Ok(tree);
                };
                match parent.no {
                    None => {
                        parent.no = Some(complete);
                        break;
                    }
                    Some(no) => {
                        let text = std::mem::take(&mut parent.text);
                        let offset = parent.offset;
                        open.pop();
                        complete = builder
                            .question(text, no, complete)
                            .map_err(|e| invalid(offset, e))?;
                    }
                }
            }
        }
    }

    pub fn decode_bytes(&self, bytes: &[u8]) -> CodecResult<KnowledgeTree> {
        self.decode(bytes)
    }
}

/// A `Q` record whose subtrees are still being read.
struct OpenQuestion {
    text: String,
    offset: u64,
    no: Option<NodeId>,
}

fn invalid(offset: u64, err: DomainError) -> CodecError {
    CodecError::corrupt(offset, err.to_string())
}

/// Byte-level cursor over the stream that tracks its offset.
struct RecordReader<R> {
    inner: R,
    offset: u64,
    max_line_len: usize,
}

impl<R: BufRead> RecordReader<R> {
    fn new(inner: R, max_line_len: usize) -> Self {
        Self {
            inner,
            offset: 0,
            max_line_len,
        }
    }

    fn next_tag(&mut self) -> CodecResult<Option<u8>> {
        let tag = match self.inner.fill_buf().map_err(CodecError::Read)?.first() {
            Some(&tag) => tag,
            None => return Ok(None),
        };
        self.inner.consume(1);
        self.offset += 1;
        Ok(Some(tag))
    }

    /// Reads up to and including the next terminator and returns the text before it.
    /// A `\r` right before the terminator is dropped and does not count toward the bound.
    fn read_line(&mut self) -> CodecResult<String> {
        let start = self.offset;
        // room for the text plus "\r\n"
        let limit = self.max_line_len as u64 + 2;
        let mut buf = Vec::new();
        let read = self
            .inner
            .by_ref()
            .take(limit)
            .read_until(LINE_TERMINATOR, &mut buf)
            .map_err(CodecError::Read)?;
        self.offset += read as u64;

        if buf.last() != Some(&LINE_TERMINATOR) {
            if read as u64 >= limit {
                return Err(CodecError::LineTooLong {
                    limit: self.max_line_len,
                    offset: start,
                });
            }
            return Err(CodecError::corrupt(
                self.offset,
                "line is missing its terminator",
            ));
        }
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        if buf.len() > self.max_line_len {
            return Err(CodecError::LineTooLong {
                limit: self.max_line_len,
                offset: start,
            });
        }
        String::from_utf8(buf).map_err(|_| CodecError::corrupt(start, "line is not valid UTF-8"))
    }

    fn at_end(&mut self) -> CodecResult<bool> {
        Ok(self.inner.fill_buf().map_err(CodecError::Read)?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bark_tree() -> KnowledgeTree {
        let mut tree = KnowledgeTree::default();
        tree.grow(tree.root(), "Does it bark?", "dog").unwrap();
        tree
    }

    #[test]
    fn given_default_tree_when_encoding_then_single_record() {
        let bytes = Codec::default()
            .encode_to_vec(&KnowledgeTree::default())
            .unwrap();

        assert_eq!(bytes, b"Acat\n");
    }

    #[test]
    fn given_grown_tree_when_encoding_then_no_subtree_precedes_yes_subtree() {
        let bytes = Codec::default().encode_to_vec(&bark_tree()).unwrap();

        assert_eq!(bytes, b"QDoes it bark?\nAcat\nAdog\n");
    }

    #[test]
    fn given_crlf_lines_when_decoding_then_carriage_return_dropped() {
        let tree = Codec::default()
            .decode_bytes(b"QDoes it bark?\r\nAcat\r\nAdog\r\n")
            .unwrap();

        assert_eq!(tree, bark_tree());
    }

    #[test]
    fn given_line_at_bound_when_decoding_then_accepted() {
        let codec = Codec::new(4);

        let tree = codec.decode_bytes(b"Alion\n").unwrap();

        assert_eq!(tree.animals(), vec!["lion"]);
    }

    #[test]
    fn given_crlf_line_at_bound_when_decoding_then_accepted() {
        let codec = Codec::new(4);

        let tree = codec.decode_bytes(b"Alion\r\n").unwrap();

        assert_eq!(tree.animals(), vec!["lion"]);
        assert!(matches!(
            codec.decode_bytes(b"Atiger\r\n"),
            Err(CodecError::LineTooLong { limit: 4, offset: 1 })
        ));
    }

    #[test]
    fn given_line_over_bound_when_decoding_then_line_too_long() {
        let codec = Codec::new(4);

        let err = codec.decode_bytes(b"Atiger\n").unwrap_err();

        assert!(matches!(err, CodecError::LineTooLong { limit: 4, offset: 1 }));
    }

    #[test]
    fn given_text_over_bound_when_encoding_then_nothing_written() {
        let codec = Codec::new(3);
        let mut out = Vec::new();

        let err = codec.encode(&bark_tree(), &mut out).unwrap_err();

        assert!(matches!(err, CodecError::LineTooLong { limit: 3, offset: 0 }));
        assert!(out.is_empty());
    }

    #[test]
    fn given_unknown_tag_when_decoding_then_offset_reported() {
        let err = Codec::default()
            .decode_bytes(b"QDoes it bark?\nXcat\nAdog\n")
            .unwrap_err();

        assert!(matches!(
            err,
            CodecError::UnknownTag {
                tag: b'X',
                offset: 15
            }
        ));
        assert!(err.to_string().contains("'X'"));
    }
}
