// Readers for the files the tools start from: switch configs and monitoring-tool exports.

pub mod alarm;
pub mod cisco;
pub mod elop;
pub mod hivision;
pub mod nozomi;
pub mod tcc;
