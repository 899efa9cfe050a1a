mod bitmap;
mod ordinal;
