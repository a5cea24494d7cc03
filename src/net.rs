//! Rate-limit friendly request sending.

use rand::{thread_rng, Rng};

/// Send `rb`, retrying on HTTP 429 and transport errors with jittered backoff.
///
/// Non-429 statuses are returned as-is; the caller decides what counts as failure.
pub async fn send_with_backoff(
    rb: reqwest::RequestBuilder,
    label: &str,
    max_retries: u32,
) -> Result<reqwest::Response, reqwest::Error> {
    let mut attempt = 0u32;
    loop {
        // Bodyless GETs always clone; fall back to a single attempt otherwise.
        let Some(req) = rb.try_clone() else {
            return rb.send().await;
        };
        match req.send().await {
            Ok(r) => {
                if r.status().as_u16() == 429 && attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!("[net] 429 {label} retry={attempt} backoff={back_ms}ms");
                    tokio::time::sleep(std::time::Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Ok(r);
            }
            Err(e) => {
                if attempt < max_retries {
                    attempt += 1;
                    let back_ms = backoff_delay_ms(attempt);
                    log::warn!("[net] err {label} retry={attempt} backoff={back_ms}ms : {e}");
                    tokio::time::sleep(std::time::Duration::from_millis(back_ms)).await;
                    continue;
                }
                return Err(e);
            }
        }
    }
}

fn backoff_delay_ms(attempt: u32) -> u64 {
    let base = base_delay_ms(attempt);
    let jitter: u64 = thread_rng().gen_range(0..=250);
    base + jitter
}

/// 300, 600, 1200, 2400, 4800, 9600 (capped)
fn base_delay_ms(attempt: u32) -> u64 {
    300u64.saturating_mul(1u64 << (attempt.clamp(1, 6) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_delay_doubles_and_caps() {
        assert_eq!(base_delay_ms(1), 300);
        assert_eq!(base_delay_ms(2), 600);
        assert_eq!(base_delay_ms(6), 9600);
        assert_eq!(base_delay_ms(20), 9600);
    }

    #[test]
    fn jitter_stays_bounded() {
        for attempt in 1..=3 {
            let d = backoff_delay_ms(attempt);
            let base = base_delay_ms(attempt);
            assert!(d >= base && d <= base + 250);
        }
    }
}
