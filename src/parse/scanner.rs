use super::constant::RESERVED_WORDS;

/**
 * 入力文字列と cursor を持ち、cursor 位置の token を先読みする struct。
 * 入力は変更せず、cursor を進めるのは pop のみ。
 */
pub struct Scanner {
    input: String,
    position: usize, // byte 単位での位置
}

impl Scanner {
    pub fn new(input: String) -> Scanner {
        Scanner { input, position: 0 }
    }

    /// 入力を読み切ったら true を返す
    pub fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /**
     * cursor 位置の token を、cursor を進めずに返す。
     * 予約 token に match した場合は大文字に正規化した形で返し、
     * そうでない場合は識別子・リテラルをそのまま返す。
     * 入力の終端では空文字列を返す。
     */
    pub fn peek(&self) -> String {
        let (token, _) = self.peek_with_length();
        token
    }

    /**
     * peek と同じ規則で token の長さを求め直して cursor を進め、
     * 続く空白 (space のみ。tab や改行は対象外) を読み飛ばす。
     */
    pub fn pop(&mut self) {
        let (_, len) = self.peek_with_length();
        self.position += len;
        self.pop_whitespace();
    }

    fn pop_whitespace(&mut self) {
        while self.input.as_bytes().get(self.position) == Some(&b' ') {
            self.position += 1;
        }
    }

    fn peek_with_length(&self) -> (String, usize) {
        if self.at_end() {
            return (String::new(), 0);
        }
        let rest = &self.input[self.position..];
        for word in RESERVED_WORDS {
            // 予約 token は宣言順に prefix match を試す (constant.rs の invariant を参照)。
            // get は文字境界に落ちない prefix を None にするので、multi-byte 入力でも panic しない
            if let Some(prefix) = rest.get(..word.len()) {
                if prefix.eq_ignore_ascii_case(word) {
                    return (word.to_string(), word.len());
                }
            }
        }
        self.peek_identifier_with_length(rest)
    }

    /// 次の space, comma, ')' の手前までを識別子・リテラルとして切り出す。
    /// 先頭 1 文字は区切り文字として扱わない
    fn peek_identifier_with_length(&self, rest: &str) -> (String, usize) {
        for (idx, c) in rest.char_indices().skip(1) {
            if c == ' ' || c == ',' || c == ')' {
                return (rest[..idx].to_string(), idx);
            }
        }
        (rest.to_string(), rest.len())
    }
}
