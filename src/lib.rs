//! # probabilistic-sketches
//!
//! `probabilistic-sketches` contains approximate data structures for membership testing,
//! frequency estimation, top-k tracking and cardinality estimation over large or unbounded
//! streams. Each one trades a bounded, documented error for memory that does not grow with the
//! number of items.
//!
//! Every structure is generic over the item type `T`, a [`Serializer`] that turns items into bytes
//! and a [`Hasher`] that turns bytes into 64-bit values. The defaults are [`ByteSerializer`] and
//! [`Murmur3Hasher`], so any `str` or `[u8]` item works out of the box:
//!
//! ```
//! use probabilistic_sketches::bloom::BloomFilter;
//!
//! let mut filter = BloomFilter::<str>::new(1000, 0.01).unwrap();
//! filter.add("foo").unwrap();
//! assert!(filter.contains("foo").unwrap());
//! ```
//!
//! Other item types plug in a closure or, with the `serde` feature, a bincode serializer:
//!
//! ```
//! use probabilistic_sketches::count_min_sketch::CountMinSketch;
//! use probabilistic_sketches::hash::Murmur3Hasher;
//!
//! let mut cms = CountMinSketch::<u64, _, _>::with_parts(
//!     0.01,
//!     0.01,
//!     Murmur3Hasher,
//!     |item: &u64| item.to_le_bytes().to_vec(),
//! )
//! .unwrap();
//! cms.add(&42, 3).unwrap();
//! assert!(cms.estimate_count(&42).unwrap() >= 3);
//! ```
//!
//! Constructors and operations return [`Result`]. A call that fails leaves the structure
//! unchanged.
//!
//! ## References
//!
//!  - [Scalable Bloom Filters](https://dl.acm.org/citation.cfm?id=1224501)
//!  > Almeida, Paulo Sérgio, Carlos Baquero, Nuno Preguiça, and David Hutchison. 2007. “Scalable Bloom Filters.” *Inf. Process. Lett.* 101 (6): 255–61. doi:[10.1016/j.ipl.2006.10.007](https://doi.org/10.1016/j.ipl.2006.10.007).
//!  - [An Improved Data Stream Summary: The Count-Min Sketch and its Applications](https://doi.org/10.1016/j.jalgor.2003.12.001)
//!  > Cormode, Graham, and S. Muthukrishnan. 2005. “An Improved Data Stream Summary: The Count-Min Sketch and Its Applications.” *J. Algorithms* 55 (1): 58–75.
//!  - [HeavyKeeper: An Accurate Algorithm for Finding Top-k Elephant Flows](https://www.usenix.org/conference/atc18/presentation/gong)
//!  > Gong, Junzhi, Tong Yang, Haowei Zhang, Hao Li, Steve Uhlig, Shigang Chen, Lorna Uden, and Xiaoming Li. 2018. “HeavyKeeper: An Accurate Algorithm for Finding Top-k Elephant Flows.” In *2018 USENIX Annual Technical Conference*, 909–21.
//!  - [HyperLogLog: the analysis of a near-optimal cardinality estimation algorithm](http://algo.inria.fr/flajolet/Publications/FlFuGaMe07.pdf)
//!  > Flajolet, Philippe, Éric Fusy, Olivier Gandouet, and Frédéric Meunier. 2007. “Hyperloglog: The Analysis of a Near-Optimal Cardinality Estimation Algorithm.” In *AofA ’07: Proceedings of the 2007 International Conference on Analysis of Algorithms*.
//!  - [Less hashing, same performance: Building a better Bloom filter](https://dl.acm.org/citation.cfm?id=1400125)
//!  > Kirsch, Adam, and Michael Mitzenmacher. 2008. “Less Hashing, Same Performance: Building a Better Bloom Filter.” *Random Struct. Algorithms* 33 (2): 187–218. doi:[10.1002/rsa.v33:2](https://doi.org/10.1002/rsa.v33:2).
//!
//! [`Serializer`]: serializer::Serializer
//! [`Hasher`]: hash::Hasher
//! [`ByteSerializer`]: serializer::ByteSerializer
//! [`Murmur3Hasher`]: hash::Murmur3Hasher

#![warn(missing_docs)]

pub mod bit_vec;
pub mod bloom;
pub mod count_min_sketch;
pub mod error;
pub mod hash;
pub mod hyperloglog;
pub mod serializer;
pub mod top_k;
mod util;

pub use crate::error::{Error, Result};
