#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Text frames are UTF-8 by the time they reach the driver.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = pong_bot_client::protocol::decode_inbound(text);
        let _ = serde_json::from_str::<pong_bot_client::MoveCommand>(text);
    }
});
