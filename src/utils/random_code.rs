use rand::Rng;

// 去掉易混淆的 0/O/1/I
const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// 生成指定长度的随机代码（大写字母与数字）
pub fn generate_random_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length_and_charset() {
        let code = generate_random_code(8);
        assert_eq!(code.len(), 8);
        assert!(code.bytes().all(|b| CHARSET.contains(&b)));
    }
}
