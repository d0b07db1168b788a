mod others;
mod shape;
