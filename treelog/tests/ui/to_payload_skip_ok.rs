use treelog::{Payload, ToPayload};

#[derive(ToPayload)]
struct Pair(#[payload(skip)] String, u32);

fn main() {
    let pair = Pair("hidden".to_owned(), 7);
    assert_eq!(pair.to_payload(), Payload::List(vec![7u32.to_payload()]));
}
