#![allow(dead_code)]

use treelog::ToPayload;

#[derive(ToPayload)]
struct Pair(#[payload(rename = "left")] String, u32);

fn main() {}
