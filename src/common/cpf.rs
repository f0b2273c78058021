// src/common/cpf.rs

/// Remove tudo que não for dígito ("123.456.789-09" -> "12345678909").
pub fn normalize(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Valida um CPF (com ou sem máscara) pelos dois dígitos verificadores.
pub fn is_valid(raw: &str) -> bool {
    let digits: Vec<u32> = normalize(raw)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 11 {
        return false;
    }

    // Sequências repetidas (000..., 111...) passam na conta mas são inválidas.
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    (9..11).all(|position| check_digit(&digits[..position]) == digits[position])
}

fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    ((sum * 10) % 11) % 10
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_known_valid_numbers() {
        assert!(is_valid("529.982.247-25"));
        assert!(is_valid("52998224725"));
        assert!(is_valid("111.444.777-35"));
    }

    #[test]
    fn rejects_wrong_length_and_repeated_digits() {
        assert!(!is_valid(""));
        assert!(!is_valid("5299822472"));
        assert!(!is_valid("529982247250"));
        assert!(!is_valid("111.111.111-11"));
        assert!(!is_valid("00000000000"));
    }

    #[test]
    fn rejects_wrong_check_digits() {
        assert!(!is_valid("529.982.247-26"));
        assert!(!is_valid("529.982.247-15"));
    }

    #[test]
    fn normalize_keeps_only_digits() {
        assert_eq!(normalize(" 529.982.247-25 "), "52998224725");
    }

    fn with_check_digits(base: &[u32]) -> String {
        let mut digits = base.to_vec();
        let first = check_digit(&digits);
        digits.push(first);
        let second = check_digit(&digits);
        digits.push(second);
        digits.iter().map(|d| char::from_digit(*d, 10).unwrap()).collect()
    }

    proptest! {
        #[test]
        fn generated_numbers_validate_regardless_of_mask(base in proptest::collection::vec(0u32..10, 9)) {
            prop_assume!(!base.iter().all(|d| *d == base[0]));
            let cpf = with_check_digits(&base);
            let masked = format!("{}.{}.{}-{}", &cpf[0..3], &cpf[3..6], &cpf[6..9], &cpf[9..11]);
            prop_assert!(is_valid(&cpf));
            prop_assert!(is_valid(&masked));
            prop_assert_eq!(normalize(&masked), cpf);
        }

        #[test]
        fn flipping_the_last_digit_invalidates(base in proptest::collection::vec(0u32..10, 9), bump in 1u32..10) {
            prop_assume!(!base.iter().all(|d| *d == base[0]));
            let cpf = with_check_digits(&base);
            let last = cpf.chars().last().and_then(|c| c.to_digit(10)).unwrap();
            let tampered = format!("{}{}", &cpf[..10], (last + bump) % 10);
            prop_assert!(!is_valid(&tampered));
        }
    }
}
