// Parser module: extracts structured search payloads out of raw pages.

pub mod nuxt;

pub use nuxt::NuxtStateParser;
