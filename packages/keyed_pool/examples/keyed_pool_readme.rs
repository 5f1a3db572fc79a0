//! Reuses one "decoder" per frame size, evicting the least useful one when the pool is full.

use std::io;

use keyed_pool::{KeyedPool, PoolKey};

#[derive(Debug)]
struct Decoder {
    width: u16,
    height: u16,
    frames_decoded: u32,
}

fn main() {
    let mut pool = KeyedPool::<Decoder>::builder().capacity(2).build();

    let requests = [(1920, 1080), (1280, 720), (1920, 1080), (640, 360), (1920, 1080)];

    for (width, height) in requests {
        let key = PoolKey::from_dimensions(width, height);

        let decoder = pool
            .acquire(key, |config| {
                println!(
                    "Constructing decoder for {width}x{height} on device {}",
                    config.device_id()
                );

                Ok::<_, io::Error>(Decoder {
                    width,
                    height,
                    frames_decoded: 0,
                })
            })
            .unwrap();

        decoder.frames_decoded += 4;

        println!(
            "Decoded with {}x{} decoder, {} frames so far",
            decoder.width, decoder.height, decoder.frames_decoded
        );
    }

    for key in pool.keys() {
        println!("Pooled: {key} (score {:?})", pool.hit_score(key));
    }
}
