use ringlease_rs::Ring;
use std::sync::Arc;
use std::thread;

#[test]
fn s1_capacity_and_basic_publish() {
    let ring: Ring<u8, 11> = Ring::new();
    assert_eq!(ring.capacity(), 11);
    assert_eq!(ring.max_size(), 10);
    assert!(ring.empty());

    {
        let mut lease = ring.prepare(5).unwrap();
        for (i, slot) in lease.iter_mut().enumerate() {
            *slot = i as u8;
        }
    }
    assert_eq!(ring.size(), 5);

    {
        let mut lease = ring.prepare(5).unwrap();
        for (i, slot) in lease.iter_mut().enumerate() {
            *slot = 100 + i as u8;
        }
    }
    assert_eq!(ring.size(), 10);
    assert!(ring.full());

    assert!(ring.prepare(1).is_err());

    {
        let lease = ring.read(10).unwrap();
        assert_eq!(
            lease.iter().copied().collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 100, 101, 102, 103, 104]
        );
    }
    assert_eq!(ring.size(), 0);

    assert!(ring.read(1).is_err());
}

/// Three writers acquire leases of 4 in order (generators `i`, `2i`, `2i+1`),
/// release out of that order, and a concurrently-waiting `read(9)` only
/// succeeds once the oldest writer's release publishes the whole run.
#[test]
fn s2_wrap_around() {
    let ring: Arc<Ring<u8, 15>> = Arc::new(Ring::new());

    let mut a = ring.prepare(4).unwrap();
    let mut b = ring.prepare(4).unwrap();
    let mut c = ring.prepare(4).unwrap();

    for (i, slot) in a.iter_mut().enumerate() {
        *slot = i as u8; // generator i
    }
    for (i, slot) in b.iter_mut().enumerate() {
        *slot = (2 * i) as u8; // generator 2i
    }
    for (i, slot) in c.iter_mut().enumerate() {
        *slot = (2 * i + 1) as u8; // generator 2i+1
    }

    let reader_ring = Arc::clone(&ring);
    let reader = thread::spawn(move || loop {
        if let Ok(lease) = reader_ring.read(9) {
            return lease.iter().copied().collect::<Vec<_>>();
        }
        thread::yield_now();
    });

    // Release out of acquisition order: c, then b, then a (the oldest) last.
    drop(c);
    drop(b);
    thread::sleep(std::time::Duration::from_millis(5));
    assert_eq!(ring.size(), 0, "nothing publishes until the oldest writer (a) releases");
    drop(a);

    let read = reader.join().unwrap();
    assert_eq!(read, vec![0, 1, 2, 3, 0, 2, 4, 6, 1]);
    assert_eq!(ring.size(), 3);
    assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![3, 5, 7]);
}

/// Continues from S2's end state (`size() == 3`, live content `[3, 5, 7]`): a
/// write of 10 acquires immediately, a concurrent write of 11 must wait for
/// capacity, and a concurrent read of 10 must wait for the write of 10 to
/// publish. Once everything settles, `size() == 14` and `full()` holds.
#[test]
fn s3_refill_across_the_boundary() {
    let ring: Arc<Ring<u8, 15>> = Arc::new(Ring::new());

    // Replay S2's end state directly.
    {
        let mut a = ring.prepare(4).unwrap();
        let mut b = ring.prepare(4).unwrap();
        let mut c = ring.prepare(4).unwrap();
        for (i, slot) in a.iter_mut().enumerate() {
            *slot = i as u8;
        }
        for (i, slot) in b.iter_mut().enumerate() {
            *slot = (2 * i) as u8;
        }
        for (i, slot) in c.iter_mut().enumerate() {
            *slot = (2 * i + 1) as u8;
        }
        drop(c);
        drop(b);
        drop(a);
    }
    let _ = ring.read(9).unwrap();
    assert_eq!(ring.size(), 3);
    assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![3, 5, 7]);

    // 11 slots are free (14 usable - 3 live), so a write of 10 acquires now.
    let mut w1 = ring.prepare(10).unwrap();
    for (i, slot) in w1.iter_mut().enumerate() {
        *slot = 200 + i as u8;
    }

    // A write of 11 can't fit yet (only 1 lendable slot remains once w1's
    // acquire advanced `after_stop`); it waits for a read to reclaim space.
    let w2_ring = Arc::clone(&ring);
    let w2 = thread::spawn(move || loop {
        if let Ok(mut lease) = w2_ring.prepare(11) {
            for (i, slot) in lease.iter_mut().enumerate() {
                *slot = 50 + i as u8;
            }
            return lease;
        }
        thread::yield_now();
    });

    thread::sleep(std::time::Duration::from_millis(5));
    assert_eq!(ring.size(), 3, "w1 hasn't published yet");

    // Releasing w1 publishes it, unblocking the concurrent read(10).
    drop(w1);

    let read_ring = Arc::clone(&ring);
    let reader = thread::spawn(move || loop {
        if let Ok(lease) = read_ring.read(10) {
            return lease.iter().copied().collect::<Vec<_>>();
        }
        thread::yield_now();
    });

    let read = reader.join().unwrap();
    assert_eq!(read, vec![3, 5, 7, 200, 201, 202, 203, 204, 205, 206]);

    // Releasing the read reclaims its capacity, finally letting w2 acquire.
    let w2_lease = w2.join().unwrap();
    drop(w2_lease);

    assert_eq!(ring.size(), 14);
    assert!(ring.full());
    assert_eq!(
        ring.iter().copied().collect::<Vec<_>>(),
        vec![207, 208, 209, 50, 51, 52, 53, 54, 55, 56, 57, 58, 59, 60]
    );
}

#[test]
fn s4_out_of_order_write_release() {
    let ring: Ring<u8, 16> = Ring::new();

    let mut a = ring.prepare(3).unwrap();
    let mut b = ring.prepare(2).unwrap();

    for (i, slot) in b.iter_mut().enumerate() {
        *slot = 10 + i as u8;
    }
    for (i, slot) in a.iter_mut().enumerate() {
        *slot = i as u8;
    }

    drop(b);
    assert_eq!(ring.size(), 0, "publication must wait for the oldest lease");

    drop(a);
    assert_eq!(ring.size(), 5);
    assert_eq!(
        ring.iter().copied().collect::<Vec<_>>(),
        vec![0, 1, 2, 10, 11]
    );
}

#[test]
fn s4_out_of_order_read_release_is_symmetric() {
    let ring: Ring<u8, 16> = Ring::new();
    {
        let mut lease = ring.prepare(5).unwrap();
        for (i, slot) in lease.iter_mut().enumerate() {
            *slot = i as u8;
        }
    }

    let a = ring.read(3).unwrap();
    let b = ring.read(2).unwrap();

    drop(b);
    // capacity is not reclaimed until the oldest read (a) also releases
    assert!(ring.prepare(14).is_err());

    drop(a);
    let lease = ring.prepare(14).unwrap();
    assert_eq!(lease.len(), 14);
}

#[tokio::test]
async fn s5_async_wait_resolves_after_producer_releases() {
    let ring = Arc::new(Ring::<u8, 16>::new());

    let producer_ring = Arc::clone(&ring);
    let producer = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let mut lease = producer_ring.prepare(8).unwrap();
        for (i, slot) in lease.iter_mut().enumerate() {
            *slot = i as u8;
        }
    });

    let lease = ring.async_read(8).await;
    assert_eq!(lease.len(), 8);
    assert_eq!(
        lease.iter().copied().collect::<Vec<_>>(),
        (0u8..8).collect::<Vec<_>>()
    );
    drop(lease);
    assert_eq!(ring.size(), 0);

    producer.await.unwrap();
}

#[test]
fn s6_empty_read_on_empty_buffer() {
    let ring: Ring<u8, 8> = Ring::new();
    let lease = ring.read_all();
    assert_eq!(lease.len(), 0);
    assert!(lease.is_empty());
    drop(lease);
    assert_eq!(ring.size(), 0);
}

#[test]
fn threaded_producer_consumer_preserves_fifo_order() {
    const N: u64 = 50_000;
    let ring = Arc::new(Ring::<u64, 256>::new());

    let producer_ring = Arc::clone(&ring);
    let producer = thread::spawn(move || {
        let mut sent = 0u64;
        while sent < N {
            if let Ok(mut lease) = producer_ring.prepare(1) {
                lease[0] = sent;
                sent += 1;
            } else {
                thread::yield_now();
            }
        }
    });

    let mut received = Vec::with_capacity(N as usize);
    while received.len() < N as usize {
        let lease = ring.read_all();
        if lease.is_empty() {
            drop(lease);
            thread::yield_now();
        } else {
            received.extend(lease.iter().copied());
        }
    }

    producer.join().unwrap();
    assert_eq!(received, (0..N).collect::<Vec<_>>());
}
