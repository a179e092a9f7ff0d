use std::collections::HashMap;

use ztk_io::Buffer;

use crate::{Datatype, Instruction, ScriptError, Symbol};

/// A loaded `.DAT` file: the symbol table with its three indices and
/// the code segment.
#[derive(Debug, Clone)]
pub struct Script {
    version: u8,
    symbols: Vec<Symbol>,
    symbols_by_name: HashMap<String, u32>,
    symbols_by_address: HashMap<u32, u32>,
    text: Buffer,
}

impl Script {
    pub fn parse(buf: &mut Buffer) -> Result<Script, ScriptError> {
        let version = buf.get_u8()?;
        let symbol_count = buf.get_u32()? as usize;

        // the sort table is discarded; the name index replaces it
        buf.skip(symbol_count * 4)?;

        let mut symbols = Vec::with_capacity(symbol_count + 1);
        let mut symbols_by_name = HashMap::with_capacity(symbol_count + 1);
        let mut symbols_by_address = HashMap::with_capacity(symbol_count);

        for index in 0..symbol_count as u32 {
            let mut symbol = Symbol::parse(buf)?;
            symbol.set_index(index);

            symbols_by_name.insert(symbol.name().to_uppercase(), index);

            let addressable = matches!(
                symbol.datatype(),
                Datatype::Prototype | Datatype::Instance
            ) || (symbol.datatype() == Datatype::Function
                && symbol.is_const()
                && !symbol.is_member());
            if addressable {
                symbols_by_address.insert(symbol.address(), index);
            }

            symbols.push(symbol);
        }

        // synthetic heap slot for temporary string pushes
        let temporary = Symbol::temporary_strings(symbols.len() as u32);
        symbols_by_name.insert(temporary.name().to_uppercase(), temporary.index());
        symbols.push(temporary);

        let text_size = buf.get_u32()? as usize;
        let text = buf.extract(text_size)?;

        Ok(Script {
            version,
            symbols,
            symbols_by_name,
            symbols_by_address,
            text,
        })
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Size of the code segment in bytes.
    pub fn size(&self) -> usize {
        self.text.limit()
    }

    /// Decodes the instruction at `address`.
    pub fn instruction_at(&self, address: u32) -> Result<Instruction, ScriptError> {
        let mut cursor = self.text.clone();
        cursor.set_position(address as usize)?;
        Instruction::decode(&mut cursor)
    }

    pub fn find_symbol_by_index(&self, index: u32) -> Option<&Symbol> {
        self.symbols.get(index as usize)
    }

    pub fn find_symbol_by_index_mut(&mut self, index: u32) -> Option<&mut Symbol> {
        self.symbols.get_mut(index as usize)
    }

    /// Case-insensitive name lookup.
    pub fn find_symbol_by_name(&self, name: &str) -> Option<&Symbol> {
        let index = *self.symbols_by_name.get(&name.to_uppercase())?;
        self.find_symbol_by_index(index)
    }

    pub fn find_symbol_by_name_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let index = *self.symbols_by_name.get(&name.to_uppercase())?;
        self.find_symbol_by_index_mut(index)
    }

    /// Looks up the prototype, instance or const function covering a
    /// code address.
    pub fn find_symbol_by_address(&self, address: u32) -> Option<&Symbol> {
        let index = *self.symbols_by_address.get(&address)?;
        self.find_symbol_by_index(index)
    }

    /// The parameter symbols of a function, stored directly after it in
    /// the table.
    pub fn find_parameters_for_function(&self, function: &Symbol) -> Vec<&Symbol> {
        (0..function.count())
            .filter_map(|i| self.find_symbol_by_index(function.index() + i + 1))
            .collect()
    }

    /// Visits every instance symbol whose parent chain leads to the
    /// class called `name`, directly or through a prototype.
    pub fn enumerate_instances_by_class_name(&self, name: &str, mut callback: impl FnMut(&Symbol)) {
        let Some(class) = self.find_symbol_by_name(name) else {
            return;
        };
        let class_index = class.index() as i32;

        let mut prototypes = Vec::new();
        for symbol in &self.symbols {
            if symbol.datatype() == Datatype::Prototype && symbol.parent() == class_index {
                prototypes.push(symbol.index() as i32);
            } else if symbol.datatype() == Datatype::Instance
                && (prototypes.contains(&symbol.parent()) || symbol.parent() == class_index)
            {
                callback(symbol);
            }
        }
    }
}
