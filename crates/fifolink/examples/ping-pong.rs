//! Two peers trading confirmed messages over a pair of links.
//!
//! Run with:
//!   cargo run --example ping-pong
//!
//! The same exchange can be driven from a shell with the CLI:
//!   LTP_FIFO_PATH=/tmp/links fifolink recreate p2c
//!   LTP_FIFO_PATH=/tmp/links fifolink receive p2c 0 &
//!   LTP_FIFO_PATH=/tmp/links fifolink send p2c ping 1000

use std::thread;

use fifolink::{ChannelDir, Timeout};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = ChannelDir::create_temp()?;
    dir.recreate("p2c")?;
    dir.recreate("c2p")?;
    eprintln!("Links in {}", dir.path().display());

    let child_dir = dir.clone();
    let child = thread::spawn(move || -> fifolink::link::Result<()> {
        for _ in 0..3 {
            let msg = child_dir.receive("p2c", 64, Timeout::Infinite)?;
            eprintln!("child got {:?}", String::from_utf8_lossy(&msg));
            child_dir.send("c2p", b"pong", Timeout::Infinite)?;
        }
        Ok(())
    });

    for round in 1..=3 {
        let msg = format!("ping {round}");
        dir.send("p2c", msg.as_bytes(), Timeout::from_millis(1000))?;
        let reply = dir.receive("c2p", 64, Timeout::from_millis(1000))?;
        eprintln!("parent got {:?}", String::from_utf8_lossy(&reply));
    }

    child.join().map_err(|_| "child thread panicked")??;
    Ok(())
}
