#![allow(dead_code)]

use treelog::ToPayload;

#[derive(ToPayload)]
enum Level {
    Low,
    High,
}

fn main() {}
