//! Built-in predicates: even, odd, prime.
//!
//! All three are pure and total over `i64`; they never fail and hold no
//! state.

/// True iff `n` is divisible by 2. Zero and negative even numbers count.
pub fn is_even(n: i64) -> bool {
    n % 2 == 0
}

/// True iff `n` is not divisible by 2.
pub fn is_odd(n: i64) -> bool {
    n % 2 != 0
}

/// Primality by trial division.
///
/// Checks odd divisors `d` while `d <= n / d`, which bounds `d` by the
/// integer square root without computing a float sqrt and cannot overflow.
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n == 2 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }

    let mut d: i64 = 3;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_odd_complement() {
        for n in [-7, -2, -1, 0, 1, 2, 3, 100, i64::MIN, i64::MAX] {
            assert_eq!(is_even(n), !is_odd(n), "complement broken at {}", n);
        }
    }

    #[test]
    fn test_zero_and_negatives_are_even() {
        assert!(is_even(0));
        assert!(is_even(-4));
        assert!(is_odd(-3));
    }

    #[test]
    fn test_prime_below_two() {
        for n in [-10, -1, 0, 1] {
            assert!(!is_prime(n), "{} must not be prime", n);
        }
    }

    #[test]
    fn test_two_is_the_only_even_prime() {
        assert!(is_prime(2));
        for n in (4..100).step_by(2) {
            assert!(!is_prime(n), "{} is even and > 2", n);
        }
    }

    #[test]
    fn test_prime_set_up_to_twenty() {
        let primes: Vec<i64> = (1..=20).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19]);
    }

    #[test]
    fn test_prime_near_square() {
        // 49 = 7*7 exercises the d <= n / d bound being inclusive.
        assert!(!is_prime(49));
        assert!(is_prime(47));
        assert!(!is_prime(121));
    }

    #[test]
    fn test_large_prime() {
        assert!(is_prime(1_000_003));
        assert!(!is_prime(1_000_001)); // 101 * 9901
    }
}
