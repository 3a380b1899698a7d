#![allow(dead_code)]

use treelog::ToPayload;

#[derive(ToPayload)]
union Bits {
    int: u32,
    float: f32,
}

fn main() {}
