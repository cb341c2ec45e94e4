use std::fmt;

/**
 * 文の種類。先頭の keyword から一度だけ決まる
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/**
 * parse の結果として返す、平坦な構造の record。
 * parse 中に engine が埋めていき、呼び出し側へ返した後は変更されない。
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    kind: StatementKind,
    table_name: String,
    // SELECT の選択列、INSERT の列名、UPDATE の更新列のいずれか
    fields: Vec<String>,
    // WHERE 句を field, operator, value の並びで平坦に持つ。expression tree にはしない
    condition: Vec<String>,
    group_by_fields: Vec<String>,
    // HAVING は予約語としては認識するが、これを埋める production は存在しない
    having_condition: Vec<String>,
    order_by_fields: Vec<String>,
    // VALUES の行ごとに 1 つの内側 Vec を持つ
    insert_values: Vec<Vec<String>>,
    // UPDATE の値。fields と同じ長さで、位置が対応する
    update_values: Vec<String>,
}

impl Query {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            table_name: String::new(),
            fields: vec![],
            condition: vec![],
            group_by_fields: vec![],
            having_condition: vec![],
            order_by_fields: vec![],
            insert_values: vec![],
            update_values: vec![],
        }
    }

    pub fn get_kind(&self) -> StatementKind {
        self.kind
    }
    pub fn get_table_name(&self) -> &String {
        &self.table_name
    }
    pub fn get_fields(&self) -> &Vec<String> {
        &self.fields
    }
    pub fn get_condition(&self) -> &Vec<String> {
        &self.condition
    }
    pub fn get_group_by_fields(&self) -> &Vec<String> {
        &self.group_by_fields
    }
    pub fn get_having_condition(&self) -> &Vec<String> {
        &self.having_condition
    }
    pub fn get_order_by_fields(&self) -> &Vec<String> {
        &self.order_by_fields
    }
    pub fn get_insert_values(&self) -> &Vec<Vec<String>> {
        &self.insert_values
    }
    pub fn get_update_values(&self) -> &Vec<String> {
        &self.update_values
    }

    pub(crate) fn set_table_name(&mut self, table_name: String) {
        self.table_name = table_name;
    }
    pub(crate) fn push_field(&mut self, field: String) {
        self.fields.push(field);
    }
    pub(crate) fn push_condition(&mut self, token: String) {
        self.condition.push(token);
    }
    pub(crate) fn push_group_by_field(&mut self, field: String) {
        self.group_by_fields.push(field);
    }
    pub(crate) fn push_order_by_field(&mut self, field: String) {
        self.order_by_fields.push(field);
    }
    /// VALUES の新しい行を開始する
    pub(crate) fn start_insert_row(&mut self) {
        self.insert_values.push(vec![]);
    }
    /// 最後に開始した行へ値を追加する
    pub(crate) fn push_insert_value(&mut self, value: String) {
        if let Some(row) = self.insert_values.last_mut() {
            row.push(value);
        }
    }
    pub(crate) fn push_update_value(&mut self, value: String) {
        self.update_values.push(value);
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut statement = match self.kind {
            StatementKind::Select => {
                format!("select {} from {}", self.fields.join(", "), self.table_name)
            }
            StatementKind::Insert => {
                let mut statement = format!("insert into {}", self.table_name);
                if !self.fields.is_empty() {
                    statement += &format!(" ({})", self.fields.join(", "));
                }
                statement += " values ";
                let rows: Vec<String> = self
                    .insert_values
                    .iter()
                    .map(|row| format!("({})", row.join(", ")))
                    .collect();
                statement += &rows.join(", ");
                statement
            }
            StatementKind::Update => {
                let pairs: Vec<String> = self
                    .fields
                    .iter()
                    .zip(self.update_values.iter())
                    .map(|(field, value)| format!("{} = {}", field, value))
                    .collect();
                format!("update {} set {}", self.table_name, pairs.join(", "))
            }
            StatementKind::Delete => format!("delete from {}", self.table_name),
        };
        if !self.condition.is_empty() {
            statement += " where ";
            statement += &self.condition.join(" ");
        }
        if !self.group_by_fields.is_empty() {
            statement += " group by ";
            statement += &self.group_by_fields.join(", ");
        }
        if !self.order_by_fields.is_empty() {
            statement += " order by ";
            statement += &self.order_by_fields.join(", ");
        }
        write!(f, "{}", statement)
    }
}
