#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use prop_reflect as reflect;
pub use prop_utils as utils;
